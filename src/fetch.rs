//! File fetcher: download one file into the staging tree

use crate::error::{MirrorError, Result};
use crate::session::Session;
use crate::tree::path;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Download `url` into `dest`, creating missing parent directories.
///
/// The body is streamed into a hidden temporary file beside `dest` and renamed
/// over it once complete, so `dest` either holds the whole body or is untouched.
/// Returns the number of bytes written. There are no retries.
pub async fn fetch_file(session: &Session, url: &str, dest: &Path) -> Result<u64> {
    let parsed = path::parse_http_url(url)?;

    let parent = dest.parent().ok_or_else(|| {
        MirrorError::staging(
            dest,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "destination has no parent directory",
            ),
        )
    })?;
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| MirrorError::staging(parent, e))?;

    let _permit = session.acquire().await?;
    let mut response = session
        .get(&parsed)
        .send()
        .await
        .map_err(|e| MirrorError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MirrorError::RemoteFetch {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let (file, part_path) = tempfile::Builder::new()
        .prefix(".repomirror-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| MirrorError::staging(parent, e))?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| MirrorError::transport(url, e))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| MirrorError::staging(&*part_path, e))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| MirrorError::staging(&*part_path, e))?;
    drop(file);

    part_path
        .persist(dest)
        .map_err(|e| MirrorError::staging(dest, e.error))?;

    debug!(url, path = %dest.display(), bytes = written, "Fetched file");
    Ok(written)
}
