//! Report persistence

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::TestReport;

/// On-disk report format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}

impl TestReport {
    /// Write the report to `path`
    pub fn save_report(&self, path: &Path, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Text => {
                fs::write(path, &self.text)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
            }
            ReportFormat::Json => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create report: {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, self)
                    .context("Failed to serialize report")?;
                writer
                    .flush()
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
            }
            ReportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)
                    .with_context(|| format!("Failed to create report: {}", path.display()))?;

                writer.write_record(["test_name", "category", "passed", "duration_ms", "error"])?;
                for result in &self.results {
                    writer.write_record([
                        result.test_name.clone(),
                        result.category().to_string(),
                        result.passed.to_string(),
                        format!("{:.2}", result.duration_ms),
                        result.error_message.clone().unwrap_or_default(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Report saved to {}", path.display());
        Ok(())
    }
}
