//! Path and URL derivation for tree entries
//!
//! Every entry maps to exactly one staging path and, for directories, one
//! sub-listing URL. Both are pure functions of the parent and the entry name.

use crate::error::{MirrorError, Result};
use reqwest::Url;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Parse a listing or download URL. Only absolute http(s) URLs are accepted.
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| MirrorError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(MirrorError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Reject names that would escape or alias the destination directory.
///
/// A name must be exactly one normal path component on this platform, contain
/// no separator or NUL, and carry no drive prefix (`C:x` on Windows resolves
/// against that drive's working directory instead of the parent).
pub fn validate_entry_name(listing_url: &str, name: &str) -> Result<()> {
    if name.contains(['/', '\\', '\0']) || has_drive_prefix(name) || !is_single_component(name) {
        return Err(MirrorError::UnsafeEntryName {
            url: listing_url.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => component == OsStr::new(name),
        _ => false,
    }
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Staging path of an entry: the parent destination joined with the entry name.
pub fn child_path(parent: &Path, name: &str) -> PathBuf {
    parent.join(name)
}

/// Listing URL of a subdirectory: the parent listing URL with `name` appended as
/// one percent-encoded path segment. Query and fragment are carried over.
pub fn child_listing_url(parent: &Url, name: &str) -> Result<Url> {
    let mut url = parent.clone();
    url.path_segments_mut()
        .map_err(|_| MirrorError::InvalidUrl {
            url: parent.to_string(),
            reason: "URL cannot have path segments appended".to_string(),
        })?
        .pop_if_empty()
        .push(name);
    Ok(url)
}

/// Canonicalize the staging root so every reported path is absolute.
pub fn canonical_staging_root(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| MirrorError::staging(path, e))
}
