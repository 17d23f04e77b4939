//! CLI output: error mapping from domain errors to the one-line CLI surface.

use crate::error::MirrorError;
use std::error::Error;

/// Map a run error to the single line printed on stderr, with its causes appended.
pub fn map_error(e: &MirrorError) -> String {
    let mut line = format!("error: {}", e);
    let mut cause = e.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !line.contains(&text) {
            line.push_str(": ");
            line.push_str(&text);
        }
        cause = inner.source();
    }
    line.replace('\n', "; ")
}
