//! Repository mirror: one session, one walk from the root listing

use crate::error::{MirrorError, Result};
use crate::session::{Session, SessionOptions};
use crate::tree::path;
use crate::tree::{TreeWalker, WalkOptions, WalkSummary};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Settings for a mirror operation
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    pub session: SessionOptions,
    pub walk: WalkOptions,
}

/// Result of a successful mirror
#[derive(Debug, Clone)]
pub struct Mirror {
    /// Every regular file under the staging directory, sorted
    pub files: Vec<PathBuf>,
    pub summary: WalkSummary,
}

/// Mirror the tree listed at `root_url` into `staging_dir`.
///
/// Partially written files are left in place when the walk fails.
pub async fn mirror(root_url: &str, staging_dir: &Path, options: &MirrorOptions) -> Result<Mirror> {
    let root = path::parse_http_url(root_url)?;
    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| MirrorError::staging(staging_dir, e))?;

    let session = Session::new(&options.session, &root)?;
    let walker = TreeWalker::new(&session, options.walk.clone());

    info!(root_url = %root, staging_dir = %staging_dir.display(), "Mirroring repository tree");
    let summary = walker.walk(&root, staging_dir).await?;
    let files = collect_files(staging_dir)?;

    info!(
        files = summary.files,
        directories = summary.directories,
        bytes = summary.bytes,
        "Mirror complete"
    );
    Ok(Mirror { files, summary })
}

/// Enumerate every regular file below `root`, sorted by path.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            MirrorError::staging(path, std::io::Error::from(e))
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
