//! One end-to-end report run: fetch, format, synthesize, store, index, publish.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::activity_date::{activity_date, DEFAULT_DAY_ROLLOVER_HOUR, DEFAULT_UTC_OFFSET_HOURS};
use crate::fetcher::{
    retain_recent, MessageFetcher, MessageSource, DEFAULT_BATCH_SIZE, DEFAULT_TARGET_COUNT,
};
use crate::publisher::{PublishSummary, Publisher};
use crate::report_types::{Report, ReportIndex};
use crate::transcript::format_transcript;
use crate::{IndexBuilder, ReportError, ReportStore, ReportSynthesizer, UserDirectory};

pub const DEFAULT_LOOKBACK_HOURS: u64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub channel_id: String,
    pub target_count: usize,
    pub batch_size: usize,
    pub lookback_hours: u64,
    pub utc_offset_hours: i32,
    pub day_rollover_hour: u32,
}

impl PipelineConfig {
    pub fn for_channel(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            target_count: DEFAULT_TARGET_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            day_rollover_hour: DEFAULT_DAY_ROLLOVER_HOUR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedReport {
    pub report: Report,
    pub path: PathBuf,
    pub index: ReportIndex,
    pub publish: PublishSummary,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The window held no text; nothing was synthesized or written.
    NoContent,
    Saved(Box<SavedReport>),
}

pub struct ReportPipeline<'a> {
    config: PipelineConfig,
    source: &'a dyn MessageSource,
    directory: UserDirectory,
    synthesizer: ReportSynthesizer,
    store: ReportStore,
    index: IndexBuilder,
    publisher: Publisher,
}

impl<'a> ReportPipeline<'a> {
    pub fn new(
        config: PipelineConfig,
        source: &'a dyn MessageSource,
        directory: UserDirectory,
        synthesizer: ReportSynthesizer,
        store: ReportStore,
        index: IndexBuilder,
        publisher: Publisher,
    ) -> Self {
        Self {
            config,
            source,
            directory,
            synthesizer,
            store,
            index,
            publisher,
        }
    }

    /// Runs every stage once. Stages are strictly sequential; the first
    /// fatal error stops the run before any later stage touches disk.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome, ReportError> {
        let fetched = MessageFetcher::new(self.source, self.config.batch_size)
            .fetch(&self.config.channel_id, self.config.target_count)
            .await?;
        let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let recent = retain_recent(fetched, now_ms, self.config.lookback_hours);

        let Some(transcript) = format_transcript(&recent, &self.directory) else {
            info!(
                channel_id = %self.config.channel_id,
                "no message content in window, skipping report"
            );
            return Ok(RunOutcome::NoContent);
        };

        let today = activity_date(
            now,
            self.config.utc_offset_hours,
            self.config.day_rollover_hour,
        );
        let report = self
            .synthesizer
            .synthesize(&transcript, today, &self.directory.known_projects_text())
            .await?;
        let path = self.store.save(&report)?;
        let index = self.index.rebuild()?;
        let publish = self.publisher.publish(&report, &path).await;

        Ok(RunOutcome::Saved(Box::new(SavedReport {
            report,
            path,
            index,
            publish,
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use digest_ai::{ChatRequest, ChatResponse, ChatUsage, DigestAiError, LlmClient, Message};
    use digest_discord::{ChannelMessage, MessageAuthor};
    use serde_json::json;

    use super::{PipelineConfig, ReportPipeline, RunOutcome};
    use crate::fetcher::MessageSource;
    use crate::publisher::Publisher;
    use crate::{
        IndexBuilder, ReportError, ReportStore, ReportSynthesizer, SynthesizerConfig, UserDirectory,
    };

    struct FixedHistory(Vec<ChannelMessage>);

    #[async_trait]
    impl MessageSource for FixedHistory {
        async fn fetch_page(
            &self,
            _channel_id: &str,
            limit: usize,
            before: Option<&str>,
        ) -> Result<Vec<ChannelMessage>> {
            if before.is_some() {
                return Ok(Vec::new());
            }
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct CountingLlm {
        replies: Mutex<VecDeque<String>>,
        calls: Mutex<usize>,
    }

    impl CountingLlm {
        fn new(replies: Vec<String>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().expect("calls lock")
        }
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, DigestAiError> {
            *self.calls.lock().expect("calls lock") += 1;
            let reply = self
                .replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .ok_or_else(|| DigestAiError::InvalidResponse("exhausted".to_string()))?;
            Ok(ChatResponse {
                message: Message::assistant(reply),
                finish_reason: Some("stop".to_string()),
                usage: ChatUsage::default(),
            })
        }
    }

    fn text_message(id: &str, content: &str) -> ChannelMessage {
        ChannelMessage {
            id: id.to_string(),
            content: content.to_string(),
            author: MessageAuthor {
                id: "100".to_string(),
                username: "akira".to_string(),
                global_name: None,
            },
        }
    }

    fn reply(summary: &str) -> String {
        json!({
            "date": "2025-01-03",
            "channelSummary": summary,
            "users": {"100": {"name": "akira", "role": "participant", "progress": "p"}}
        })
        .to_string()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            lookback_hours: 0,
            ..PipelineConfig::for_channel("42")
        }
    }

    fn pipeline<'a>(
        source: &'a FixedHistory,
        llm: Arc<CountingLlm>,
        root: &std::path::Path,
    ) -> ReportPipeline<'a> {
        let reports = root.join("reports");
        ReportPipeline::new(
            config(),
            source,
            UserDirectory::default(),
            ReportSynthesizer::new(llm, SynthesizerConfig::for_model("m")),
            ReportStore::new(&reports),
            IndexBuilder::new(&reports, root.join("index.json")),
            Publisher::disabled(),
        )
    }

    #[tokio::test]
    async fn functional_empty_window_never_calls_llm_or_writes() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let history = FixedHistory(vec![text_message("2", ""), text_message("1", " ")]);
        let llm = Arc::new(CountingLlm::new(vec![reply("unused")]));

        let outcome = pipeline(&history, llm.clone(), tempdir.path())
            .run(Utc::now())
            .await
            .expect("run");

        assert!(matches!(outcome, RunOutcome::NoContent));
        assert_eq!(llm.calls(), 0);
        assert!(!tempdir.path().join("reports").exists());
        assert!(!tempdir.path().join("index.json").exists());
    }

    #[tokio::test]
    async fn integration_rerun_same_day_overwrites_report_and_keeps_single_index_entry() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let history = FixedHistory(vec![text_message("1", "shipped it")]);
        let llm = Arc::new(CountingLlm::new(vec![reply("first"), reply("second")]));
        let now = Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap();
        let pipeline = pipeline(&history, llm.clone(), tempdir.path());

        pipeline.run(now).await.expect("first run");
        let outcome = pipeline.run(now).await.expect("second run");

        let RunOutcome::Saved(saved) = outcome else {
            panic!("expected a saved report");
        };
        assert_eq!(saved.report.channel_summary, "second");
        assert_eq!(saved.index.dates, vec!["2025-01-03".to_string()]);
        let on_disk = ReportStore::new(tempdir.path().join("reports"))
            .load("2025-01-03")
            .expect("load");
        assert_eq!(on_disk.channel_summary, "second");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn regression_synthesis_failure_leaves_store_and_index_untouched() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let history = FixedHistory(vec![text_message("1", "hello")]);
        let llm = Arc::new(CountingLlm::new(vec!["{\"date\": 3}".to_string()]));

        let error = pipeline(&history, llm, tempdir.path())
            .run(Utc::now())
            .await
            .expect_err("invalid reply");

        assert!(matches!(error, ReportError::Synthesis(_)));
        assert!(!tempdir.path().join("reports").exists());
        assert!(!tempdir.path().join("index.json").exists());
    }
}
