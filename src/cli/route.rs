//! CLI route: run context built from config plus flags, then one run.

use crate::config::{ConfigLoader, MirrorConfig};
use crate::error::{MirrorError, Result};
use crate::report::ReportFormat;
use crate::run::{run, RunOptions};
use crate::tree::UnknownEntryPolicy;
use std::path::Path;
use tracing::debug;

use crate::cli::parse::Cli;

/// Runtime context for CLI execution: the resolved run options and report format.
/// Built from the config file layers with command-line flags applied last.
#[derive(Debug)]
pub struct RunContext {
    options: RunOptions,
    format: ReportFormat,
}

impl RunContext {
    /// Load configuration (explicit `--config` or the layered default) and apply flags.
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = match cli.config {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(Path::new("."))?,
        };
        apply_overrides(&mut config, cli);
        Self::from_config(&config.validated()?)
    }

    pub fn from_config(config: &MirrorConfig) -> Result<Self> {
        Ok(Self {
            options: RunOptions::from_config(config)?,
            format: config.output.format,
        })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Run to completion on a fresh runtime and render the report.
    pub fn execute(&self) -> Result<String> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| MirrorError::Config(format!("Failed to create async runtime: {}", e)))?;
        debug!(root_url = %self.options.root_url, "Executing run");
        let report = rt.block_on(run(&self.options))?;
        report.render(self.format)
    }
}

/// Command-line flags take precedence over every config layer.
pub fn apply_overrides(config: &mut MirrorConfig, cli: &Cli) {
    if let Some(ref url) = cli.url {
        config.source.root_url = Some(url.clone());
    }
    if let Some(ref token) = cli.token {
        config.source.token = Some(token.clone());
    }
    if let Some(ref dir) = cli.staging_dir {
        config.staging.base_dir = Some(dir.clone());
    }
    if let Some(n) = cli.max_concurrency {
        config.walk.max_concurrent_requests = Some(n);
    }
    if let Some(depth) = cli.max_depth {
        config.walk.max_depth = Some(depth);
    }
    if cli.skip_unknown {
        config.walk.unknown_entries = UnknownEntryPolicy::Skip;
    }
    if let Some(algorithm) = cli.algorithm {
        config.digest.algorithm = algorithm;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
}
