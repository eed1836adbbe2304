use std::path::PathBuf;

use clap::{ArgAction, Parser};
use digest_discord::DEFAULT_DISCORD_API_BASE;

pub(crate) const DEFAULT_API_BASE: &str = "https://api.z.ai/api/coding/paas/v4";
pub(crate) const DEFAULT_MODEL: &str = "glm-4-plus";

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_hour_of_day(value: &str) -> Result<u32, String> {
    let parsed = value
        .parse::<u32>()
        .map_err(|error| format!("failed to parse hour: {error}"))?;
    if parsed > 23 {
        return Err("value must be in range 0..=23".to_string());
    }
    Ok(parsed)
}

fn parse_utc_offset(value: &str) -> Result<i32, String> {
    let parsed = value
        .parse::<i32>()
        .map_err(|error| format!("failed to parse offset: {error}"))?;
    if !(-12..=14).contains(&parsed) {
        return Err("value must be in range -12..=14".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "channel-digest",
    about = "Summarize a Discord channel's recent conversation into a dated daily report",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "DIGEST_CHANNEL_ID",
        help = "Channel to summarize. Falls back to targetChannels.<channel-key> in the discord config file."
    )]
    pub(crate) channel_id: Option<String>,

    #[arg(
        long,
        env = "DIGEST_DISCORD_CONFIG",
        default_value = "config/discord-config.json",
        help = "JSON file with a targetChannels map used when --channel-id is unset"
    )]
    pub(crate) discord_config: PathBuf,

    #[arg(
        long,
        env = "DIGEST_CHANNEL_KEY",
        default_value = "test",
        help = "Key under targetChannels to read the channel id from"
    )]
    pub(crate) channel_key: String,

    #[arg(
        long,
        env = "DIGEST_USER_DIRECTORY",
        default_value = "config/user-mapping.json",
        help = "User directory mapping author ids to names, roles, and projects"
    )]
    pub(crate) user_directory: PathBuf,

    #[arg(
        long,
        env = "DISCORD_BOT_TOKEN",
        hide_env_values = true,
        help = "Bot token used for channel history and notifications"
    )]
    pub(crate) discord_bot_token: Option<String>,

    #[arg(
        long,
        env = "DIGEST_DISCORD_API_BASE",
        default_value = DEFAULT_DISCORD_API_BASE,
        help = "Discord REST API base URL"
    )]
    pub(crate) discord_api_base: String,

    #[arg(
        long,
        env = "ZAI_API_KEY",
        hide_env_values = true,
        help = "API key for the chat-completions service"
    )]
    pub(crate) api_key: Option<String>,

    #[arg(
        long = "openai-api-key",
        env = "OPENAI_API_KEY",
        hide = true,
        hide_env_values = true
    )]
    pub(crate) openai_api_key: Option<String>,

    #[arg(
        long,
        env = "OPENAI_BASE_URL",
        default_value = DEFAULT_API_BASE,
        help = "Base URL of the OpenAI-compatible chat-completions service"
    )]
    pub(crate) api_base: String,

    #[arg(
        long,
        env = "DIGEST_MODEL",
        default_value = DEFAULT_MODEL,
        help = "Model identifier sent with every completion request"
    )]
    pub(crate) model: String,

    #[arg(
        long,
        env = "DIGEST_TARGET_COUNT",
        default_value_t = 100,
        value_parser = parse_positive_usize,
        help = "Maximum number of messages to collect"
    )]
    pub(crate) target_count: usize,

    #[arg(
        long,
        env = "DIGEST_BATCH_SIZE",
        default_value_t = 20,
        value_parser = parse_positive_usize,
        help = "Messages requested per history page"
    )]
    pub(crate) batch_size: usize,

    #[arg(
        long,
        env = "DIGEST_LOOKBACK_HOURS",
        default_value_t = 24,
        help = "Ignore messages older than this many hours (0 disables the window)"
    )]
    pub(crate) lookback_hours: u64,

    #[arg(
        long,
        env = "DIGEST_UTC_OFFSET_HOURS",
        default_value_t = 9,
        allow_negative_numbers = true,
        value_parser = parse_utc_offset,
        help = "Channel-local UTC offset used to resolve the report date"
    )]
    pub(crate) utc_offset_hours: i32,

    #[arg(
        long,
        env = "DIGEST_DAY_ROLLOVER_HOUR",
        default_value_t = 4,
        value_parser = parse_hour_of_day,
        help = "Local hour before which runs still report on the previous day"
    )]
    pub(crate) day_rollover_hour: u32,

    #[arg(
        long,
        env = "DIGEST_DATA_DIR",
        default_value = "data",
        help = "Directory holding reports/ and index.json"
    )]
    pub(crate) data_dir: PathBuf,

    #[arg(
        long,
        env = "DIGEST_REPO_DIR",
        default_value = ".",
        help = "Git working tree that receives the report commit"
    )]
    pub(crate) repo_dir: PathBuf,

    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "Token used to push over HTTPS together with --github-repo"
    )]
    pub(crate) github_token: Option<String>,

    #[arg(
        long,
        env = "DIGEST_GITHUB_REPO",
        help = "owner/name slug to push to when a GitHub token is set"
    )]
    pub(crate) github_repo: Option<String>,

    #[arg(
        long,
        env = "DIGEST_NOTIFICATION_CHANNEL_ID",
        help = "Channel that receives the report-ready notice"
    )]
    pub(crate) notification_channel_id: Option<String>,

    #[arg(
        long,
        env = "DIGEST_REPORT_URL",
        help = "Viewer URL included in the notice"
    )]
    pub(crate) report_url: Option<String>,

    #[arg(
        long,
        env = "DIGEST_REPORT_PASSPHRASE",
        hide_env_values = true,
        help = "Viewer passphrase included in the notice"
    )]
    pub(crate) report_passphrase: Option<String>,

    #[arg(
        long,
        env = "DIGEST_REQUEST_TIMEOUT_MS",
        default_value_t = 0,
        help = "Per-request HTTP timeout in milliseconds (0 keeps the transport default)"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long,
        env = "DIGEST_NO_PUBLISH",
        action = ArgAction::SetTrue,
        help = "Skip the git commit/push and the notification"
    )]
    pub(crate) no_publish: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Only rebuild index.json from the reports directory, then exit"
    )]
    pub(crate) rebuild_index: bool,
}
