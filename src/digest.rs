//! Content digests for staged files
//!
//! Files are streamed through the hasher in fixed-size chunks on the blocking
//! pool. Chunking never changes the result: the digest always equals the digest
//! of the file's full content.

use crate::error::{MirrorError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Supported digest functions
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    pub fn hasher(self) -> ContentHasher {
        match self {
            DigestAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => ContentHasher::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incremental hasher for one of the supported algorithms
pub enum ContentHasher {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl ContentHasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::Sha256(hasher) => hasher.update(data),
            ContentHasher::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    /// Lowercase hexadecimal digest
    pub fn finalize_hex(self) -> String {
        match self {
            ContentHasher::Sha256(hasher) => hex::encode(hasher.finalize()),
            ContentHasher::Blake3(hasher) => hex::encode(hasher.finalize().as_bytes()),
        }
    }
}

/// Aggregator settings
#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub algorithm: DigestAlgorithm,
    pub chunk_size: usize,
    /// Files hashed at once (None = available parallelism)
    pub max_concurrent: Option<usize>,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent: None,
        }
    }
}

/// A staged file paired with its digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestRecord {
    pub path: PathBuf,
    pub digest: String,
}

/// Digest an in-memory buffer.
pub fn digest_bytes(algorithm: DigestAlgorithm, data: &[u8]) -> String {
    let mut hasher = algorithm.hasher();
    hasher.update(data);
    hasher.finalize_hex()
}

/// Digest a file by streaming it in `chunk_size` pieces.
pub fn digest_file(path: &Path, algorithm: DigestAlgorithm, chunk_size: usize) -> Result<String> {
    let digest_io = |source: std::io::Error| MirrorError::DigestIo {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(digest_io)?;
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(digest_io(e)),
        }
    }

    Ok(hasher.finalize_hex())
}

/// Digest every path concurrently.
///
/// Fails with the first error encountered; no partial result is returned.
/// Records come back sorted by path.
pub async fn digest_all(paths: Vec<PathBuf>, options: &DigestOptions) -> Result<Vec<DigestRecord>> {
    let limit = options
        .max_concurrent
        .unwrap_or_else(default_parallelism)
        .max(1);
    let algorithm = options.algorithm;
    let chunk_size = options.chunk_size;

    let mut records: Vec<DigestRecord> = stream::iter(paths)
        .map(move |path| async move {
            let task_path = path.clone();
            let digest = tokio::task::spawn_blocking(move || {
                digest_file(&task_path, algorithm, chunk_size)
            })
            .await
            .map_err(|e| MirrorError::Task(format!("digest of {} failed: {}", path.display(), e)))??;

            debug!(path = %path.display(), %algorithm, "Digested file");
            Ok::<_, MirrorError>(DigestRecord { path, digest })
        })
        .buffer_unordered(limit)
        .try_collect()
        .await?;

    records.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(records)
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
