//! Discord REST helpers for reading channel history and posting notices.
//!
//! Pagination and recency filtering live with the report pipeline.

mod discord_api_client;
mod discord_message;
mod snowflake;

pub use discord_api_client::{
    DiscordApiClient, DiscordApiError, PostedMessage, DEFAULT_DISCORD_API_BASE,
};
pub use discord_message::{ChannelMessage, MessageAuthor};
pub use snowflake::{compare_snowflakes, snowflake_timestamp_ms, DISCORD_EPOCH_MS};
