mod bootstrap_helpers;
mod cli_args;
mod git_publisher;
mod runtime_config;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use digest_ai::OpenAiClient;
use digest_discord::DiscordApiClient;
use digest_report::{
    IndexBuilder, Notifier, Publisher, ReportPipeline, ReportStore, ReportSynthesizer, RunOutcome,
    SynthesizerConfig, UserDirectory, VersionControl,
};
use tracing::{error, info};

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::git_publisher::GitPublisher;
use crate::runtime_config::RuntimeConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if let Err(run_error) = run_cli(cli).await {
        error!("daily report run failed: {run_error:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_cli(cli: Cli) -> Result<()> {
    if cli.rebuild_index {
        return rebuild_index_only(&cli);
    }
    let config = RuntimeConfig::from_cli(&cli)?;
    info!(
        channel_id = %config.pipeline.channel_id,
        model = %config.model,
        "starting daily report run"
    );

    let directory = UserDirectory::load(&config.user_directory_path)?;
    let discord = DiscordApiClient::new(
        &config.discord_api_base,
        &config.discord_bot_token,
        config.completion.request_timeout_ms,
    )
    .context("failed to build discord client")?;
    let completion =
        OpenAiClient::new(config.completion.clone()).context("failed to build completion client")?;
    let synthesizer = ReportSynthesizer::new(
        Arc::new(completion),
        SynthesizerConfig::for_model(config.model.clone()),
    );

    let publisher = match &config.publish {
        Some(settings) => {
            let version_control: Box<dyn VersionControl> = Box::new(GitPublisher::new(
                settings.repo_dir.clone(),
                settings.remote.clone(),
            ));
            let notifier: Box<dyn Notifier> = Box::new(discord.clone());
            Publisher::new(
                Some(version_control),
                Some(notifier),
                settings.notification.clone(),
            )
        }
        None => Publisher::disabled(),
    };

    let pipeline = ReportPipeline::new(
        config.pipeline.clone(),
        &discord,
        directory,
        synthesizer,
        ReportStore::new(config.reports_dir.clone()),
        IndexBuilder::new(config.reports_dir.clone(), config.index_path.clone()),
        publisher,
    );

    match pipeline.run(Utc::now()).await? {
        RunOutcome::NoContent => info!("nothing to report"),
        RunOutcome::Saved(saved) => {
            let rendered = serde_json::to_string_pretty(&saved.report)
                .context("failed to render report")?;
            println!("{rendered}");
            info!(
                path = %saved.path.display(),
                dates = saved.index.dates.len(),
                committed = saved.publish.committed,
                notified = saved.publish.notified,
                "daily report run complete"
            );
        }
    }
    Ok(())
}

/// Rebuilds the index without credentials or network access.
fn rebuild_index_only(cli: &Cli) -> Result<()> {
    let builder = IndexBuilder::new(cli.data_dir.join("reports"), cli.data_dir.join("index.json"));
    let index = builder.rebuild()?;
    let rendered = serde_json::to_string_pretty(&index).context("failed to render index")?;
    println!("{rendered}");
    Ok(())
}
