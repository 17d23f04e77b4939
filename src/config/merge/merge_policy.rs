//! Merge rules: defaults, override order, conflict handling.

use crate::digest::DEFAULT_CHUNK_SIZE;
use crate::session::{default_user_agent, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
/// Later sources override these key by key; sections a source omits keep them.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default(
            "http.connect_timeout_secs",
            DEFAULT_CONNECT_TIMEOUT.as_secs() as i64,
        )?
        .set_default(
            "http.request_timeout_secs",
            DEFAULT_REQUEST_TIMEOUT.as_secs() as i64,
        )?
        .set_default("http.user_agent", default_user_agent())?
        .set_default("walk.unknown_entries", "error")?
        .set_default("digest.algorithm", "sha256")?
        .set_default("digest.chunk_size", DEFAULT_CHUNK_SIZE as i64)?
        .set_default("output.format", "text")
}
