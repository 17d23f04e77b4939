//! Error types for repository mirroring and digesting.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Every failure a run can surface. All of them are fail-fast: the first one
/// observed aborts the walk (or the digest pass) and becomes the run's result.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to fetch {url}: HTTP {status}")]
    RemoteFetch { url: String, status: u16 },

    #[error("Failed to list {url}: {reason}")]
    Listing { url: String, reason: String },

    #[error("Unknown entry kind '{kind}' for '{name}' in listing {url}")]
    UnknownEntryKind {
        url: String,
        name: String,
        kind: String,
    },

    #[error("Failed to digest {}: {source}", path.display())]
    DigestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsafe entry name {name:?} in listing {url}")]
    UnsafeEntryName { url: String, name: String },

    #[error("Directory depth limit of {max_depth} exceeded at {url}")]
    DepthLimitExceeded { url: String, max_depth: usize },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Staging I/O error at {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render report: {0}")]
    Report(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl MirrorError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        MirrorError::Transport {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MirrorError::Staging {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for MirrorError {
    fn from(err: config::ConfigError) -> Self {
        MirrorError::Config(err.to_string())
    }
}
