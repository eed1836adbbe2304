use thiserror::Error;

#[derive(Debug, Error)]
/// Failures that end a report run before anything is persisted.
///
/// Degraded fetches and publish failures are logged where they happen and
/// never surface here.
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("report synthesis failed: {0}")]
    Synthesis(String),
    #[error("failed to persist report: {0:#}")]
    Store(anyhow::Error),
    #[error("failed to rebuild report index: {0:#}")]
    Index(anyhow::Error),
}

impl ReportError {
    pub fn synthesis(detail: impl Into<String>) -> Self {
        Self::Synthesis(detail.into())
    }

    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::Configuration(detail.into())
    }
}
