use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use digest_ai::{OpenAiClient, OpenAiConfig};
use digest_discord::DiscordApiClient;
use digest_report::{
    IndexBuilder, NotificationConfig, Notifier, PipelineConfig, Publisher, ReportIndex,
    ReportPipeline, ReportStore, ReportSynthesizer, RunOutcome, SynthesizerConfig, UserDirectory,
};
use httpmock::prelude::*;
use serde_json::{json, Value};

const CHANNEL_ID: &str = "4242";
const NOTICE_CHANNEL_ID: &str = "777";

fn directory() -> UserDirectory {
    serde_json::from_value(json!({
        "users": {
            "100": {"name": "Akira", "role": "organizer"}
        },
        "excludedBots": ["900"]
    }))
    .expect("directory")
}

fn completion_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig {
        api_base: server.url("/v4"),
        api_key: "llm-key".to_string(),
        request_timeout_ms: 5_000,
    })
    .expect("completion client")
}

fn discord_client(server: &MockServer) -> DiscordApiClient {
    DiscordApiClient::new(&server.base_url(), "bot-token", 5_000).expect("discord client")
}

fn config() -> PipelineConfig {
    PipelineConfig {
        lookback_hours: 0,
        ..PipelineConfig::for_channel(CHANNEL_ID)
    }
}

fn completion_body(report: Value) -> Value {
    json!({
        "choices": [{
            "message": {"content": format!("```json\n{report}\n```")},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    })
}

fn read_json(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path).expect("read artifact");
    serde_json::from_str(&raw).expect("artifact json")
}

#[tokio::test]
async fn integration_pipeline_fetches_synthesizes_persists_indexes_and_notifies() {
    let discord = MockServer::start();
    let llm = MockServer::start();
    let tempdir = tempfile::tempdir().expect("tempdir");
    let reports_dir = tempdir.path().join("reports");
    let index_path = tempdir.path().join("index.json");
    std::fs::create_dir_all(&reports_dir).expect("reports dir");
    std::fs::write(reports_dir.join("2025-01-01.json"), "{}").expect("older report");

    let history = discord.mock(|when, then| {
        when.method(GET)
            .path(format!("/channels/{CHANNEL_ID}/messages"))
            .header("authorization", "Bot bot-token")
            .query_param("limit", "20");
        then.status(200).json_body(json!([
            {
                "id": "30",
                "content": "thanks, that fixed it",
                "author": {"id": "200", "username": "mika", "global_name": "Mika"}
            },
            {
                "id": "20",
                "content": "beep",
                "author": {"id": "900", "username": "helper", "bot": true}
            },
            {"id": "15", "content": "", "author": {"id": "100", "username": "akira"}},
            {
                "id": "10",
                "content": "try clearing the cache",
                "author": {"id": "100", "username": "akira"}
            }
        ]));
    });
    let completion = llm.mock(|when, then| {
        when.method(POST)
            .path("/v4/chat/completions")
            .header("authorization", "Bearer llm-key")
            .body_includes("Akira (organizer): try clearing the cache\\nMika (participant): thanks, that fixed it");
        then.status(200).json_body(completion_body(json!({
            "date": "2025-01-03",
            "channelSummary": "キャッシュ問題を解決",
            "users": {
                "200": {"name": "Mika", "role": "participant", "progress": "fixed the build",
                        "adviceReceived": [{"from": "Akira", "content": "clear the cache"}]},
                "100": {"name": "Akira", "role": "organizer", "progress": null}
            }
        })));
    });
    let notice = discord.mock(|when, then| {
        when.method(POST)
            .path(format!("/channels/{NOTICE_CHANNEL_ID}/messages"))
            .body_includes("Daily Report (2025-01-03)");
        then.status(200)
            .json_body(json!({"id": "1", "channel_id": NOTICE_CHANNEL_ID}));
    });

    let source = discord_client(&discord);
    let notifier: Box<dyn Notifier> = Box::new(discord_client(&discord));
    let pipeline = ReportPipeline::new(
        config(),
        &source,
        directory(),
        ReportSynthesizer::new(
            Arc::new(completion_client(&llm)),
            SynthesizerConfig::for_model("glm-4-plus"),
        ),
        ReportStore::new(&reports_dir),
        IndexBuilder::new(&reports_dir, &index_path),
        Publisher::new(
            None,
            Some(notifier),
            NotificationConfig {
                channel_id: Some(NOTICE_CHANNEL_ID.to_string()),
                report_url: Some("https://reports.example.com/".to_string()),
                passphrase: None,
            },
        ),
    );

    let now = Utc.with_ymd_and_hms(2025, 1, 3, 12, 0, 0).unwrap();
    let outcome = pipeline.run(now).await.expect("pipeline run");

    history.assert();
    completion.assert();
    notice.assert();
    let RunOutcome::Saved(saved) = outcome else {
        panic!("expected a saved report");
    };
    assert!(saved.publish.notified);
    assert!(!saved.publish.committed);
    assert_eq!(saved.path, reports_dir.join("2025-01-03.json"));

    let artifact = read_json(&saved.path);
    assert_eq!(artifact["channelSummary"], "キャッシュ問題を解決");
    let user_ids = artifact["users"]
        .as_object()
        .expect("users object")
        .keys()
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(user_ids, vec!["200".to_string(), "100".to_string()]);
    assert_eq!(artifact["users"]["100"]["progress"], "none");
    assert_eq!(artifact["users"]["100"]["interestsAndQuestions"], "none");
    assert_eq!(artifact["users"]["200"]["adviceReceived"][0]["from"], "Akira");

    let index: ReportIndex =
        serde_json::from_value(read_json(&index_path)).expect("index artifact");
    assert_eq!(index.dates, vec!["2025-01-03".to_string(), "2025-01-01".to_string()]);
    assert_eq!(index, saved.index);
}

#[tokio::test]
async fn integration_pipeline_with_only_empty_messages_skips_completion_and_writes_nothing() {
    let discord = MockServer::start();
    let llm = MockServer::start();
    let tempdir = tempfile::tempdir().expect("tempdir");
    let reports_dir = tempdir.path().join("reports");
    let index_path = tempdir.path().join("index.json");

    discord.mock(|when, then| {
        when.method(GET).path(format!("/channels/{CHANNEL_ID}/messages"));
        then.status(200).json_body(json!([
            {"id": "2", "content": "", "author": {"id": "100", "username": "akira"}},
            {"id": "1", "content": "   ", "author": {"id": "200", "username": "mika"}}
        ]));
    });
    let completion = llm.mock(|when, then| {
        when.method(POST).path("/v4/chat/completions");
        then.status(500);
    });

    let source = discord_client(&discord);
    let pipeline = ReportPipeline::new(
        config(),
        &source,
        directory(),
        ReportSynthesizer::new(
            Arc::new(completion_client(&llm)),
            SynthesizerConfig::for_model("glm-4-plus"),
        ),
        ReportStore::new(&reports_dir),
        IndexBuilder::new(&reports_dir, &index_path),
        Publisher::disabled(),
    );

    let outcome = pipeline.run(Utc::now()).await.expect("pipeline run");

    assert!(matches!(outcome, RunOutcome::NoContent));
    completion.assert_calls(0);
    assert!(!reports_dir.exists());
    assert!(!index_path.exists());
}

#[tokio::test]
async fn regression_discord_failure_mid_pagination_still_produces_a_report() {
    let discord = MockServer::start();
    let llm = MockServer::start();
    let tempdir = tempfile::tempdir().expect("tempdir");
    let reports_dir = tempdir.path().join("reports");
    let index_path = tempdir.path().join("index.json");

    let first_page = (0..20)
        .map(|offset| {
            json!({
                "id": (1_000 - offset).to_string(),
                "content": format!("message {offset}"),
                "author": {"id": "100", "username": "akira"}
            })
        })
        .collect::<Vec<_>>();
    let older = discord.mock(|when, then| {
        when.method(GET)
            .path(format!("/channels/{CHANNEL_ID}/messages"))
            .query_param("before", "981");
        then.status(502).body("bad gateway");
    });
    let newest = discord.mock(|when, then| {
        when.method(GET)
            .path(format!("/channels/{CHANNEL_ID}/messages"))
            .query_param("limit", "20")
            .query_param_missing("before");
        then.status(200).json_body(Value::Array(first_page));
    });
    let completion = llm.mock(|when, then| {
        when.method(POST).path("/v4/chat/completions");
        then.status(200).json_body(completion_body(json!({
            "date": "2025-01-03",
            "channelSummary": "partial day",
            "users": {}
        })));
    });

    let source = discord_client(&discord);
    let pipeline = ReportPipeline::new(
        config(),
        &source,
        directory(),
        ReportSynthesizer::new(
            Arc::new(completion_client(&llm)),
            SynthesizerConfig::for_model("glm-4-plus"),
        ),
        ReportStore::new(&reports_dir),
        IndexBuilder::new(&reports_dir, &index_path),
        Publisher::disabled(),
    );

    let outcome = pipeline.run(Utc::now()).await.expect("degraded fetch is not fatal");

    newest.assert();
    older.assert();
    completion.assert();
    assert!(matches!(outcome, RunOutcome::Saved(_)));
    assert!(reports_dir.join("2025-01-03.json").exists());
}
