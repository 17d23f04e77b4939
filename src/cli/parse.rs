//! CLI parse: clap types for repomirror. No behavior; definitions only.

use crate::digest::DigestAlgorithm;
use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

/// repomirror - mirror a remote repository tree and digest every file
#[derive(Parser, Debug)]
#[command(name = "repomirror")]
#[command(version)]
#[command(about = "Mirror a repository through its contents API and print a digest for every file")]
pub struct Cli {
    /// Root listing URL (overrides source.root_url from config)
    pub url: Option<String>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API token sent as `Authorization: token <TOKEN>`
    #[arg(long, env = "REPOMIRROR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Parent directory for the per-run staging directory
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Maximum HTTP requests in flight
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Maximum directory depth below the root listing
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Skip listing entries that are neither files nor directories
    #[arg(long)]
    pub skip_unknown: bool,

    /// Digest algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Enable verbose logging (debug level)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
