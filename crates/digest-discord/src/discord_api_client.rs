//! Discord REST client used for history paging and notification posts.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::ChannelMessage;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Debug, Error)]
pub enum DiscordApiError {
    #[error("missing discord bot token")]
    MissingBotToken,
    #[error("discord api base cannot be empty")]
    MissingApiBase,
    #[error("discord request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("discord api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode discord {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostedMessage {
    pub id: String,
    pub channel_id: String,
}

#[derive(Clone)]
pub struct DiscordApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl DiscordApiClient {
    /// `request_timeout_ms == 0` keeps the transport default.
    pub fn new(
        api_base: &str,
        bot_token: &str,
        request_timeout_ms: u64,
    ) -> Result<Self, DiscordApiError> {
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() {
            return Err(DiscordApiError::MissingApiBase);
        }
        let bot_token = bot_token.trim();
        if bot_token.is_empty() {
            return Err(DiscordApiError::MissingBotToken);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("channel-digest (rust, 0.1)"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(request_timeout_ms));
        }

        Ok(Self {
            http: builder.build()?,
            api_base: api_base.to_string(),
            bot_token: bot_token.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Returns up to `limit` messages older than `before`, newest first.
    pub async fn fetch_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<ChannelMessage>, DiscordApiError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id.trim());
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before.map(str::trim).filter(|value| !value.is_empty()) {
            query.push(("before", before.to_string()));
        }
        tracing::debug!(channel_id, limit, before = ?before, "requesting channel messages");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DiscordApiError::HttpStatus {
                operation: "channel messages",
                status: status.as_u16(),
                body: truncate_for_error(&body, 800),
            });
        }
        serde_json::from_str(&body).map_err(|source| DiscordApiError::Decode {
            operation: "channel messages",
            source,
        })
    }

    pub async fn post_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<PostedMessage, DiscordApiError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id.trim());
        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&json!({ "content": content }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DiscordApiError::HttpStatus {
                operation: "create message",
                status: status.as_u16(),
                body: truncate_for_error(&body, 800),
            });
        }
        serde_json::from_str(&body).map_err(|source| DiscordApiError::Decode {
            operation: "create message",
            source,
        })
    }
}

fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
