use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use digest_core::{rfc3339_millis_utc, write_json_pretty_atomic};
use tracing::{info, warn};

use crate::activity_date::is_iso_date;
use crate::report_types::ReportIndex;
use crate::ReportError;

#[derive(Debug, Clone)]
/// Regenerates the `index.json` manifest from the report artifacts on disk.
pub struct IndexBuilder {
    reports_dir: PathBuf,
    index_path: PathBuf,
}

impl IndexBuilder {
    pub fn new(reports_dir: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            index_path: index_path.into(),
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Rescans the reports directory and replaces the index artifact.
    pub fn rebuild(&self) -> Result<ReportIndex, ReportError> {
        let dates = scan_report_dates(&self.reports_dir).map_err(ReportError::Index)?;
        let index = ReportIndex {
            dates,
            updated_at: rfc3339_millis_utc(),
        };
        write_json_pretty_atomic(&self.index_path, &index)
            .with_context(|| format!("failed to write index {}", self.index_path.display()))
            .map_err(ReportError::Index)?;
        info!(
            reports = index.dates.len(),
            path = %self.index_path.display(),
            "report index rebuilt"
        );
        Ok(index)
    }
}

/// Dates of every `YYYY-MM-DD.json` artifact in `reports_dir`, newest first.
///
/// Other `.json` files are skipped with a warning; a missing directory has no
/// reports.
pub fn scan_report_dates(reports_dir: &Path) -> Result<Vec<String>> {
    if !reports_dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(reports_dir)
        .with_context(|| format!("failed to list {}", reports_dir.display()))?;

    let mut dates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", reports_dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            warn!(path = %path.display(), "skipping report with non UTF-8 file name");
            continue;
        };
        if is_iso_date(stem) {
            dates.push(stem.to_string());
        } else {
            warn!(file = %path.display(), "skipping invalid report file name");
        }
    }

    dates.sort_unstable_by(|left, right| right.cmp(left));
    Ok(dates)
}
