//! CLI domain: parse, route, and output only.
//! Orchestration lives in [`crate::run`]; the route builds its options and renders the report.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use route::{apply_overrides, RunContext};
