//! Run report rendering (text, json, table)

use crate::digest::{DigestAlgorithm, DigestRecord};
use crate::error::{MirrorError, Result};
use crate::tree::WalkSummary;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Report output format
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One `<path>: <digest>` line per file
    #[default]
    Text,
    Json,
    Table,
}

/// Terminal output of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub root_url: String,
    pub staging_dir: PathBuf,
    pub algorithm: DigestAlgorithm,
    pub summary: WalkSummary,
    pub files: Vec<DigestRecord>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root_url: &'a str,
    staging_dir: &'a Path,
    algorithm: DigestAlgorithm,
    summary: WalkSummary,
    files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: &'a Path,
    relative_path: String,
    digest: &'a str,
}

impl RunReport {
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.format_text()),
            ReportFormat::Json => self.format_json(),
            ReportFormat::Table => Ok(self.format_table()),
        }
    }

    fn format_text(&self) -> String {
        let mut out = String::new();
        for record in &self.files {
            let _ = writeln!(out, "{}: {}", record.path.display(), record.digest);
        }
        out
    }

    fn format_json(&self) -> Result<String> {
        let report = JsonReport {
            root_url: &self.root_url,
            staging_dir: &self.staging_dir,
            algorithm: self.algorithm,
            summary: self.summary,
            files: self
                .files
                .iter()
                .map(|record| JsonFile {
                    path: &record.path,
                    relative_path: self.relative_path(&record.path),
                    digest: &record.digest,
                })
                .collect(),
        };
        let mut out = serde_json::to_string_pretty(&report)
            .map_err(|e| MirrorError::Report(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Path".to_string(), self.algorithm.to_string()]);

        for record in &self.files {
            table.add_row(vec![self.relative_path(&record.path), record.digest.clone()]);
        }
        format!("{}\n", table)
    }

    /// Path relative to the staging directory, always `/`-separated.
    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.staging_dir).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
