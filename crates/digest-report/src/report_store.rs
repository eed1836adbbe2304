use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use digest_core::write_json_pretty_atomic;
use tracing::info;

use crate::report_types::Report;
use crate::ReportError;

#[derive(Debug, Clone)]
/// One JSON artifact per report date under a single directory.
pub struct ReportStore {
    reports_dir: PathBuf,
}

impl ReportStore {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn report_path(&self, date: &str) -> PathBuf {
        self.reports_dir.join(format!("{date}.json"))
    }

    /// Writes `report` to `{reports_dir}/{date}.json`, replacing any report
    /// already saved for that date.
    pub fn save(&self, report: &Report) -> Result<PathBuf, ReportError> {
        let path = self.report_path(&report.date);
        write_json_pretty_atomic(&path, report)
            .with_context(|| format!("failed to write report {}", path.display()))
            .map_err(ReportError::Store)?;
        info!(path = %path.display(), "report saved");
        Ok(path)
    }

    pub fn load(&self, date: &str) -> Result<Report> {
        let path = self.report_path(date);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read report {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse report {}", path.display()))
    }
}
