//! Backward pagination over a channel's message history.

use anyhow::Result;
use async_trait::async_trait;
use digest_discord::{compare_snowflakes, snowflake_timestamp_ms, ChannelMessage, DiscordApiClient};
use tracing::{info, warn};

use crate::ReportError;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_TARGET_COUNT: usize = 100;

#[async_trait]
/// A paginated, newest-first message history.
pub trait MessageSource: Send + Sync {
    /// Returns at most `limit` messages strictly older than `before`.
    async fn fetch_page(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>>;
}

#[async_trait]
impl MessageSource for DiscordApiClient {
    async fn fetch_page(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>> {
        Ok(self.fetch_messages(channel_id, limit, before).await?)
    }
}

pub struct MessageFetcher<'a> {
    source: &'a dyn MessageSource,
    batch_size: usize,
}

impl<'a> MessageFetcher<'a> {
    pub fn new(source: &'a dyn MessageSource, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
        }
    }

    /// Collects up to `target_count` messages, newest first.
    ///
    /// A failing page ends pagination and keeps what was already collected.
    pub async fn fetch(
        &self,
        channel_id: &str,
        target_count: usize,
    ) -> Result<Vec<ChannelMessage>, ReportError> {
        let channel_id = channel_id.trim();
        if channel_id.is_empty() {
            return Err(ReportError::configuration("channel id is not set"));
        }

        let mut collected: Vec<ChannelMessage> = Vec::new();
        let mut cursor: Option<String> = None;
        while collected.len() < target_count {
            let requested = self.batch_size.min(target_count - collected.len());
            info!(
                collected = collected.len(),
                requested,
                before = cursor.as_deref().unwrap_or("-"),
                "fetching message page"
            );
            let page = match self
                .source
                .fetch_page(channel_id, requested, cursor.as_deref())
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    warn!(
                        collected = collected.len(),
                        "message page request failed, keeping partial history: {error:#}"
                    );
                    break;
                }
            };

            let received = page.len();
            if received == 0 {
                break;
            }
            cursor = page
                .iter()
                .map(|message| message.id.as_str())
                .min_by(|left, right| compare_snowflakes(left, right))
                .map(str::to_string);
            let room = target_count - collected.len();
            collected.extend(page.into_iter().take(room));
            if received < requested {
                break;
            }
        }

        info!(count = collected.len(), "fetched channel history");
        Ok(collected)
    }
}

/// Drops messages created more than `lookback_hours` before `now_ms`.
///
/// `lookback_hours == 0` keeps everything, as do ids that are not snowflakes.
pub fn retain_recent(
    messages: Vec<ChannelMessage>,
    now_ms: u64,
    lookback_hours: u64,
) -> Vec<ChannelMessage> {
    if lookback_hours == 0 {
        return messages;
    }
    let cutoff_ms = now_ms.saturating_sub(lookback_hours.saturating_mul(60 * 60 * 1_000));
    let before = messages.len();
    let kept = messages
        .into_iter()
        .filter(|message| match snowflake_timestamp_ms(&message.id) {
            Some(created_ms) => created_ms >= cutoff_ms,
            None => true,
        })
        .collect::<Vec<_>>();
    if kept.len() != before {
        info!(
            dropped = before - kept.len(),
            lookback_hours, "dropped messages outside the lookback window"
        );
    }
    kept
}
