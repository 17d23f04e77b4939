//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global config file, then a
//! local (or explicitly named) config file, then `REPOMIRROR__SECTION__KEY`
//! environment variables. Command-line flags are applied on top by the CLI.

use crate::digest::{DigestAlgorithm, DEFAULT_CHUNK_SIZE};
use crate::error::{MirrorError, Result};
use crate::logging::LoggingConfig;
use crate::report::ReportFormat;
use crate::session::default_user_agent;
use crate::tree::UnknownEntryPolicy;
use config::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod local_file;
}

pub use sources::global_file::global_config_path;
pub use sources::local_file::LOCAL_CONFIG_FILE;

const ENV_PREFIX: &str = "REPOMIRROR";
const ENV_SEPARATOR: &str = "__";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub walk: WalkConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub staging: StagingConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the repository lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Root listing URL of the repository contents API
    pub root_url: Option<String>,
    /// API token sent with every request
    pub token: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Tree walk limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Maximum HTTP requests in flight (unbounded when absent)
    pub max_concurrent_requests: Option<usize>,
    /// Maximum directory depth below the root (unbounded when absent)
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub unknown_entries: UnknownEntryPolicy,
}

/// Digest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    #[serde(default)]
    pub algorithm: DigestAlgorithm,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Files hashed concurrently (available parallelism when absent)
    pub max_concurrent: Option<usize>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            chunk_size: default_chunk_size(),
            max_concurrent: None,
        }
    }
}

/// Staging directory placement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Parent directory for per-run staging directories (system temp dir when absent)
    pub base_dir: Option<PathBuf>,
}

/// Report output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Http(String),
    Walk(String),
    Digest(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Http(msg) => write!(f, "http: {}", msg),
            ValidationError::Walk(msg) => write!(f, "walk: {}", msg),
            ValidationError::Digest(msg) => write!(f, "digest: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MirrorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.http.connect_timeout_secs == 0 {
            errors.push(ValidationError::Http(
                "connect_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.http.request_timeout_secs == 0 {
            errors.push(ValidationError::Http(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            errors.push(ValidationError::Http("user_agent cannot be empty".to_string()));
        }
        if self.walk.max_concurrent_requests == Some(0) {
            errors.push(ValidationError::Walk(
                "max_concurrent_requests must be greater than zero".to_string(),
            ));
        }
        if self.digest.chunk_size == 0 {
            errors.push(ValidationError::Digest(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.digest.max_concurrent == Some(0) {
            errors.push(ValidationError::Digest(
                "max_concurrent must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one configuration error.
    pub fn validated(self) -> Result<Self> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            MirrorError::Config(format!("Configuration validation failed:\n{}", msgs.join("\n")))
        })?;
        Ok(self)
    }
}

/// Loads [`MirrorConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, `<dir>/repomirror.toml` if present, environment.
    pub fn load(dir: &Path) -> Result<MirrorConfig> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::local_file::add_to_builder(builder, dir)?;
        Self::finish(builder)
    }

    /// Defaults, the given file (which must exist), environment.
    pub fn load_from_file(path: &Path) -> Result<MirrorConfig> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::local_file::add_explicit_file(builder, path)?;
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<MirrorConfig> {
        let config: MirrorConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validated()
    }
}
