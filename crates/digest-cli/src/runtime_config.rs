use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use digest_ai::OpenAiConfig;
use digest_report::{NotificationConfig, PipelineConfig, ReportError};
use serde::Deserialize;
use tracing::warn;

use crate::cli_args::Cli;
use crate::git_publisher::PushRemote;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordConfigFile {
    #[serde(default)]
    target_channels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PublishSettings {
    pub(crate) repo_dir: PathBuf,
    pub(crate) remote: PushRemote,
    pub(crate) notification: NotificationConfig,
}

#[derive(Debug, Clone)]
/// Everything a run needs, validated before any network call.
pub(crate) struct RuntimeConfig {
    pub(crate) pipeline: PipelineConfig,
    pub(crate) discord_api_base: String,
    pub(crate) discord_bot_token: String,
    pub(crate) completion: OpenAiConfig,
    pub(crate) model: String,
    pub(crate) user_directory_path: PathBuf,
    pub(crate) reports_dir: PathBuf,
    pub(crate) index_path: PathBuf,
    pub(crate) publish: Option<PublishSettings>,
}

impl RuntimeConfig {
    pub(crate) fn from_cli(cli: &Cli) -> Result<Self, ReportError> {
        let channel_id = resolve_channel_id(cli)?;
        let discord_bot_token = non_blank(cli.discord_bot_token.as_deref())
            .ok_or_else(|| ReportError::configuration("DISCORD_BOT_TOKEN is not set"))?;
        let api_key = non_blank(cli.api_key.as_deref())
            .or_else(|| non_blank(cli.openai_api_key.as_deref()))
            .ok_or_else(|| {
                ReportError::configuration("ZAI_API_KEY (or OPENAI_API_KEY) is not set")
            })?;

        let publish = (!cli.no_publish).then(|| PublishSettings {
            repo_dir: cli.repo_dir.clone(),
            remote: PushRemote::from_options(
                cli.github_token.as_deref(),
                cli.github_repo.as_deref(),
            ),
            notification: NotificationConfig {
                channel_id: non_blank(cli.notification_channel_id.as_deref()),
                report_url: non_blank(cli.report_url.as_deref()),
                passphrase: non_blank(cli.report_passphrase.as_deref()),
            },
        });

        Ok(Self {
            pipeline: PipelineConfig {
                channel_id,
                target_count: cli.target_count,
                batch_size: cli.batch_size,
                lookback_hours: cli.lookback_hours,
                utc_offset_hours: cli.utc_offset_hours,
                day_rollover_hour: cli.day_rollover_hour,
            },
            discord_api_base: cli.discord_api_base.clone(),
            discord_bot_token,
            completion: OpenAiConfig {
                api_base: cli.api_base.clone(),
                api_key,
                request_timeout_ms: cli.request_timeout_ms,
            },
            model: cli.model.clone(),
            user_directory_path: cli.user_directory.clone(),
            reports_dir: cli.data_dir.join("reports"),
            index_path: cli.data_dir.join("index.json"),
            publish,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn resolve_channel_id(cli: &Cli) -> Result<String, ReportError> {
    if let Some(channel_id) = non_blank(cli.channel_id.as_deref()) {
        return Ok(channel_id);
    }
    let from_file = channel_from_config_file(&cli.discord_config, &cli.channel_key)?;
    from_file.ok_or_else(|| {
        ReportError::configuration(format!(
            "channel id is not set; pass --channel-id or add targetChannels.{} to {}",
            cli.channel_key,
            cli.discord_config.display()
        ))
    })
}

fn channel_from_config_file(path: &Path, key: &str) -> Result<Option<String>, ReportError> {
    if !path.exists() {
        warn!(path = %path.display(), "discord config not found");
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|error| {
        ReportError::configuration(format!("failed to read {}: {error}", path.display()))
    })?;
    let parsed: DiscordConfigFile = serde_json::from_str(&raw).map_err(|error| {
        ReportError::configuration(format!("failed to parse {}: {error}", path.display()))
    })?;
    Ok(non_blank(parsed.target_channels.get(key).map(String::as_str)))
}
