//! Run controller: staging directory, mirror, digest, report

use crate::config::MirrorConfig;
use crate::digest::{self, DigestOptions};
use crate::error::{MirrorError, Result};
use crate::mirror::{self, MirrorOptions};
use crate::report::RunReport;
use crate::session::SessionOptions;
use crate::tree::path;
use crate::tree::WalkOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const STAGING_PREFIX: &str = "repomirror-";

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root_url: String,
    /// Parent of the per-run staging directory (None = system temp dir)
    pub staging_base: Option<PathBuf>,
    pub mirror: MirrorOptions,
    pub digest: DigestOptions,
}

impl RunOptions {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            staging_base: None,
            mirror: MirrorOptions::default(),
            digest: DigestOptions::default(),
        }
    }

    /// Build run options from loaded configuration. A root URL is required.
    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        let root_url = config.source.root_url.clone().ok_or_else(|| {
            MirrorError::Config(
                "No repository URL given (pass URL or set source.root_url)".to_string(),
            )
        })?;

        Ok(Self {
            root_url,
            staging_base: config.staging.base_dir.clone(),
            mirror: MirrorOptions {
                session: SessionOptions {
                    connect_timeout: Duration::from_secs(config.http.connect_timeout_secs),
                    request_timeout: Duration::from_secs(config.http.request_timeout_secs),
                    user_agent: config.http.user_agent.clone(),
                    token: config.source.token.clone(),
                    max_concurrent_requests: config.walk.max_concurrent_requests,
                },
                walk: WalkOptions {
                    max_depth: config.walk.max_depth,
                    unknown_entries: config.walk.unknown_entries,
                },
            },
            digest: DigestOptions {
                algorithm: config.digest.algorithm,
                chunk_size: config.digest.chunk_size,
                max_concurrent: config.digest.max_concurrent,
            },
        })
    }
}

/// Create a fresh, uniquely named staging directory under `base` and return its
/// canonical path. The directory is never removed by this crate.
pub fn create_staging_dir(base: Option<&Path>) -> Result<PathBuf> {
    let base = base.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&base).map_err(|e| MirrorError::staging(&base, e))?;

    let dir = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&base)
        .map_err(|e| MirrorError::staging(&base, e))?
        .keep();
    path::canonical_staging_root(&dir)
}

/// Mirror the repository, digest every staged file and build the report.
pub async fn run(options: &RunOptions) -> Result<RunReport> {
    let staging_dir = create_staging_dir(options.staging_base.as_deref())?;
    info!(
        root_url = %options.root_url,
        staging_dir = %staging_dir.display(),
        "Starting run"
    );

    let mirrored = mirror::mirror(&options.root_url, &staging_dir, &options.mirror).await?;
    let files = digest::digest_all(mirrored.files, &options.digest).await?;

    info!(
        files = files.len(),
        algorithm = %options.digest.algorithm,
        "Run complete"
    );
    Ok(RunReport {
        root_url: options.root_url.clone(),
        staging_dir,
        algorithm: options.digest.algorithm,
        summary: mirrored.summary,
        files,
    })
}
