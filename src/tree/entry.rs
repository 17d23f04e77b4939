//! Tree entries as served by a contents-listing API

use crate::error::{MirrorError, Result};
use crate::tree::path;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One classified item of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A subdirectory, expanded by listing `<parent listing url>/<name>`
    Directory { name: String },
    /// A file, downloaded from its own absolute URL
    File { name: String, download_url: String },
}

impl TreeEntry {
    pub fn name(&self) -> &str {
        match self {
            TreeEntry::Directory { name } | TreeEntry::File { name, .. } => name,
        }
    }
}

/// What to do with entries whose kind is neither `dir` nor `file`
/// (e.g. `symlink` or `submodule` on Gitea and GitHub)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownEntryPolicy {
    /// Fail the listing with `UnknownEntryKind`
    #[default]
    Error,
    /// Log and ignore the entry
    Skip,
}

/// Wire shape of a listing item. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// Parse one listing response body into classified entries.
pub fn parse_listing(
    listing_url: &str,
    body: &[u8],
    policy: UnknownEntryPolicy,
) -> Result<Vec<TreeEntry>> {
    let raw: Vec<RawEntry> = serde_json::from_slice(body).map_err(|e| MirrorError::Listing {
        url: listing_url.to_string(),
        reason: format!("malformed listing body: {}", e),
    })?;

    let mut entries = Vec::with_capacity(raw.len());
    for item in raw {
        if let Some(entry) = classify(listing_url, item, policy)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

fn classify(
    listing_url: &str,
    raw: RawEntry,
    policy: UnknownEntryPolicy,
) -> Result<Option<TreeEntry>> {
    let entry = match raw.kind.as_str() {
        "dir" => TreeEntry::Directory { name: raw.name },
        "file" => {
            let download_url = raw.download_url.ok_or_else(|| MirrorError::Listing {
                url: listing_url.to_string(),
                reason: format!("file entry '{}' has no download_url", raw.name),
            })?;
            TreeEntry::File {
                name: raw.name,
                download_url,
            }
        }
        _ => match policy {
            UnknownEntryPolicy::Error => {
                return Err(MirrorError::UnknownEntryKind {
                    url: listing_url.to_string(),
                    name: raw.name,
                    kind: raw.kind,
                })
            }
            UnknownEntryPolicy::Skip => {
                warn!(
                    url = listing_url,
                    name = %raw.name,
                    kind = %raw.kind,
                    "Skipping entry of unknown kind"
                );
                return Ok(None);
            }
        },
    };

    path::validate_entry_name(listing_url, entry.name())?;
    Ok(Some(entry))
}
