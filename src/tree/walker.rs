//! Remote tree walker: concurrent recursive expansion of a listing API

use crate::error::{MirrorError, Result};
use crate::fetch::fetch_file;
use crate::session::Session;
use crate::tree::entry::{self, TreeEntry, UnknownEntryPolicy};
use crate::tree::path;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, TryStreamExt};
use futures::FutureExt;
use reqwest::Url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Deepest directory level to expand below the root (None = unlimited)
    pub max_depth: Option<usize>,
    /// Handling of entries that are neither files nor directories
    pub unknown_entries: UnknownEntryPolicy,
}

/// Totals for a completed walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

impl WalkSummary {
    fn merge(&mut self, other: WalkSummary) {
        self.files += other.files;
        self.directories += other.directories;
        self.bytes += other.bytes;
    }
}

/// One unit of concurrent work
#[derive(Debug)]
enum FetchTask {
    File { url: String, dest: PathBuf },
    Subtree { url: Url, dest: PathBuf, depth: usize },
}

/// Walks one remote tree into a local destination.
///
/// Each level lists its URL, turns every entry into a [`FetchTask`], launches all
/// of them together and waits for the whole set. The first failure at any depth
/// is returned from the root call; sibling tasks still in flight are dropped.
pub struct TreeWalker<'a> {
    session: &'a Session,
    options: WalkOptions,
}

impl<'a> TreeWalker<'a> {
    pub fn new(session: &'a Session, options: WalkOptions) -> Self {
        Self { session, options }
    }

    /// Mirror the tree listed at `listing_url` into `dest_dir`.
    pub async fn walk(&self, listing_url: &Url, dest_dir: &Path) -> Result<WalkSummary> {
        self.walk_level(listing_url.clone(), dest_dir.to_path_buf(), 0)
            .await
    }

    fn walk_level(&self, url: Url, dest: PathBuf, depth: usize) -> BoxFuture<'_, Result<WalkSummary>> {
        async move {
            if let Some(max_depth) = self.options.max_depth {
                if depth > max_depth {
                    return Err(MirrorError::DepthLimitExceeded {
                        url: url.to_string(),
                        max_depth,
                    });
                }
            }

            let entries = self.list(&url).await?;
            let tasks = entries
                .into_iter()
                .map(|entry| plan(&url, &dest, depth, entry))
                .collect::<Result<Vec<_>>>()?;

            let mut pending: FuturesUnordered<_> =
                tasks.into_iter().map(|task| self.run_task(task)).collect();

            let mut summary = WalkSummary::default();
            while let Some(outcome) = pending.try_next().await? {
                summary.merge(outcome);
            }
            Ok(summary)
        }
        .boxed()
    }

    fn run_task(&self, task: FetchTask) -> BoxFuture<'_, Result<WalkSummary>> {
        match task {
            FetchTask::File { url, dest } => async move {
                let bytes = fetch_file(self.session, &url, &dest).await?;
                Ok(WalkSummary {
                    files: 1,
                    directories: 0,
                    bytes,
                })
            }
            .boxed(),
            FetchTask::Subtree { url, dest, depth } => async move {
                let mut summary = self.walk_level(url, dest, depth).await?;
                summary.directories += 1;
                Ok(summary)
            }
            .boxed(),
        }
    }

    async fn list(&self, url: &Url) -> Result<Vec<TreeEntry>> {
        let body = {
            let _permit = self.session.acquire().await?;
            let response = self
                .session
                .get(url)
                .send()
                .await
                .map_err(|e| MirrorError::transport(url.as_str(), e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(MirrorError::Listing {
                    url: url.to_string(),
                    reason: format!("HTTP {}", status.as_u16()),
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| MirrorError::transport(url.as_str(), e))?
        };

        let entries = entry::parse_listing(url.as_str(), &body, self.options.unknown_entries)?;
        debug!(url = %url, entries = entries.len(), "Listed directory");
        Ok(entries)
    }
}

/// Map one listing entry to the task that materializes it.
fn plan(listing_url: &Url, dest_dir: &Path, depth: usize, entry: TreeEntry) -> Result<FetchTask> {
    match entry {
        TreeEntry::Directory { name } => Ok(FetchTask::Subtree {
            url: path::child_listing_url(listing_url, &name)?,
            dest: path::child_path(dest_dir, &name),
            depth: depth + 1,
        }),
        TreeEntry::File { name, download_url } => Ok(FetchTask::File {
            url: download_url,
            dest: path::child_path(dest_dir, &name),
        }),
    }
}
