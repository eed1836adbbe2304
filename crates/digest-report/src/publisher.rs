//! Best-effort publishing of a saved report.
//!
//! Nothing here returns an error to the pipeline: the report and index are
//! already durable by the time publishing starts.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use digest_discord::DiscordApiClient;
use tracing::{error, info, warn};

use crate::report_types::{Report, NONE_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Pushed,
    NoChanges,
}

#[async_trait]
/// Commits and pushes persisted artifacts.
pub trait VersionControl: Send + Sync {
    async fn commit_and_push(&self, message: &str) -> Result<CommitStatus>;
}

#[async_trait]
/// Posts a text notice to a channel.
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel_id: &str, content: &str) -> Result<()>;
}

#[async_trait]
impl Notifier for DiscordApiClient {
    async fn notify(&self, channel_id: &str, content: &str) -> Result<()> {
        self.post_message(channel_id, content).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationConfig {
    pub channel_id: Option<String>,
    pub report_url: Option<String>,
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishSummary {
    pub committed: bool,
    pub notified: bool,
}

pub struct Publisher {
    version_control: Option<Box<dyn VersionControl>>,
    notifier: Option<Box<dyn Notifier>>,
    notification: NotificationConfig,
}

impl Publisher {
    pub fn new(
        version_control: Option<Box<dyn VersionControl>>,
        notifier: Option<Box<dyn Notifier>>,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            version_control,
            notifier,
            notification,
        }
    }

    /// A publisher that does nothing, for `--no-publish` runs.
    pub fn disabled() -> Self {
        Self::new(None, None, NotificationConfig::default())
    }

    pub async fn publish(&self, report: &Report, saved_path: &Path) -> PublishSummary {
        let mut summary = PublishSummary::default();

        if let Some(version_control) = &self.version_control {
            let message = format!("chore: add daily report for {}", report.date);
            match version_control.commit_and_push(&message).await {
                Ok(CommitStatus::Pushed) => {
                    info!(path = %saved_path.display(), "report committed and pushed");
                    summary.committed = true;
                }
                Ok(CommitStatus::NoChanges) => info!("no artifact changes to commit"),
                Err(publish_error) => error!("git publish failed: {publish_error:#}"),
            }
        }

        let channel_id = self
            .notification
            .channel_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        match (&self.notifier, channel_id) {
            (Some(notifier), Some(channel_id)) => {
                let content = render_notification(report, &self.notification);
                match notifier.notify(channel_id, &content).await {
                    Ok(()) => {
                        info!(channel_id, "report notification sent");
                        summary.notified = true;
                    }
                    Err(publish_error) => {
                        error!("failed to send report notification: {publish_error:#}")
                    }
                }
            }
            (Some(_), None) => warn!("no notification channel configured, skipping notice"),
            (None, _) => {}
        }

        summary
    }
}

pub fn render_notification(report: &Report, config: &NotificationConfig) -> String {
    let mut lines = vec![format!(
        "📊 **Daily Report ({})** is ready!",
        report.date
    )];
    if let Some(url) = config.report_url.as_deref().filter(|url| !url.trim().is_empty()) {
        lines.push(format!("URL: {url}"));
    }
    if let Some(passphrase) = config
        .passphrase
        .as_deref()
        .filter(|passphrase| !passphrase.trim().is_empty())
    {
        lines.push(format!("Pass: `{passphrase}`"));
    }
    lines.push(String::new());
    let summary = report.channel_summary.trim();
    lines.push("📝 **Today's overview**:".to_string());
    lines.push(if summary.is_empty() {
        NONE_SENTINEL.to_string()
    } else {
        summary.to_string()
    });
    lines.join("\n")
}
