//! LLM-backed extraction of a [`Report`] from a transcript.

use std::sync::Arc;

use chrono::NaiveDate;
use digest_ai::{ChatRequest, LlmClient, Message};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::activity_date::is_iso_date;
use crate::report_types::Report;
use crate::{ReportError, Transcript};

pub const REPORT_TEMPERATURE: f32 = 0.3;
pub const REPORT_MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates daily reports from \
Discord conversations. You accept input in any language and output JSON.";

#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SynthesizerConfig {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: REPORT_TEMPERATURE,
            max_tokens: REPORT_MAX_TOKENS,
        }
    }
}

pub struct ReportSynthesizer {
    client: Arc<dyn LlmClient>,
    config: SynthesizerConfig,
}

impl ReportSynthesizer {
    pub fn new(client: Arc<dyn LlmClient>, config: SynthesizerConfig) -> Self {
        Self { client, config }
    }

    /// Asks the completion service for a report and validates the reply.
    ///
    /// The returned `date` comes from the model; it is checked for shape only
    /// and a disagreement with `today` is logged, not rejected.
    pub async fn synthesize(
        &self,
        transcript: &Transcript,
        today: NaiveDate,
        known_projects: &str,
    ) -> Result<Report, ReportError> {
        let today = today.format("%Y-%m-%d").to_string();
        let prompt = build_report_prompt(transcript.as_str(), &today, known_projects);
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
            json_mode: true,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        info!(
            model = %self.config.model,
            lines = transcript.line_count(),
            "requesting report synthesis"
        );
        let response = self
            .client
            .complete(request)
            .await
            .map_err(|error| {
                ReportError::synthesis(format!("completion request failed: {error}"))
            })?;
        debug!(raw = %response.message.content, "raw completion output");

        let report = parse_report(&response.message.content)?;
        if report.date != today {
            warn!(
                expected = %today,
                reported = %report.date,
                "synthesized report date differs from activity date"
            );
        }
        Ok(report)
    }
}

pub fn build_report_prompt(transcript: &str, today: &str, known_projects: &str) -> String {
    let known_projects = if known_projects.trim().is_empty() {
        "(none listed)"
    } else {
        known_projects
    };
    format!(
        r#"Below is a conversation log from a Discord channel. Analyze it and produce a daily report in the format shown.

Conversation log:
{transcript}

Known projects per person:
{known_projects}

Output JSON in exactly this shape:
{{
  "date": "{today}",
  "channelSummary": "summary of the whole channel conversation",
  "users": {{
    "<Discord user id, digits only>": {{
      "name": "display name",
      "role": "organizer/participant",
      "progress": "summary of development progress (\"none\" if there is none)",
      "interestsAndQuestions": "interests or questions raised outside progress updates (\"none\" if there are none)",
      "adviceReceived": [
        {{
          "from": "name of the person who gave the advice",
          "content": "summary of the advice"
        }}
      ],
      "projects": [
        {{
          "name": "project name",
          "description": "project description",
          "progress": "today's progress on this project (\"none\" if unchanged)"
        }}
      ]
    }}
  }}
}}

Rules:
- Keys of "users" must be Discord user ids (digits only), never names. Use "unknown_<name>" when the id is not known.
- Base every per-user field on what was actually said in the log.
- Record advice from bots or other assistants under "adviceReceived".
- Include every known project of a person under "projects" and add new projects that appear in the log.
- Escape newlines inside strings as \n and double quotes as \".
- Output JSON only, with no code fences or extra text."#
    )
}

/// Removes one surrounding markdown code fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches([' ', '\t']);
    let json_tagged = rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        && !rest[4..].starts_with(|c: char| c.is_ascii_alphanumeric());
    let body = if json_tagged {
        &rest[4..]
    } else {
        match rest.find('\n') {
            Some(newline) if is_fence_tag(&rest[..newline]) => &rest[newline + 1..],
            _ => rest,
        }
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn is_fence_tag(line: &str) -> bool {
    line.trim().chars().all(|c| c.is_ascii_alphanumeric())
}

/// Parses completion text into a [`Report`], rejecting anything that would
/// persist a malformed artifact.
pub fn parse_report(raw: &str) -> Result<Report, ReportError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|error| ReportError::synthesis(format!("completion is not valid JSON: {error}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| ReportError::synthesis("completion JSON is not an object"))?;

    let date = require_str(object, "date")?;
    if !is_iso_date(date) {
        return Err(ReportError::synthesis(format!(
            "report date '{date}' is not a YYYY-MM-DD calendar date"
        )));
    }
    require_str(object, "channelSummary")?;
    let users = object
        .get("users")
        .and_then(Value::as_object)
        .ok_or_else(|| ReportError::synthesis("missing or non-object top-level key 'users'"))?;
    for (user_id, entry) in users {
        let entry = entry.as_object().ok_or_else(|| {
            ReportError::synthesis(format!("user entry '{user_id}' is not an object"))
        })?;
        for field in ["name", "role"] {
            if !entry.get(field).is_some_and(Value::is_string) {
                return Err(ReportError::synthesis(format!(
                    "user entry '{user_id}' is missing string field '{field}'"
                )));
            }
        }
    }

    let mut report: Report = serde_json::from_value(value)
        .map_err(|error| ReportError::synthesis(format!("report does not match schema: {error}")))?;
    report.normalize_free_text();
    Ok(report)
}

fn require_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a str, ReportError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReportError::synthesis(format!("missing or non-string top-level key '{key}'"))
        })
}
