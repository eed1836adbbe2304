use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ChatRequest, ChatResponse, ChatUsage, DigestAiError, LlmClient, Message};

#[derive(Debug, Clone)]
/// Connection settings for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    /// `0` leaves the transport default in place.
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, DigestAiError> {
        if config.api_key.trim().is_empty() {
            return Err(DigestAiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| {
                DigestAiError::InvalidResponse(format!("invalid API key header: {e}"))
            })?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if config.request_timeout_ms > 0 {
            builder = builder.timeout(std::time::Duration::from_millis(config.request_timeout_ms));
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            return base.to_string();
        }

        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, DigestAiError> {
        let body = build_chat_request_body(&request);
        let url = self.chat_completions_url();
        tracing::debug!(model = %request.model, url = %url, "sending chat completion request");

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(DigestAiError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }
        parse_chat_response(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

fn build_chat_request_body(request: &ChatRequest) -> Value {
    let messages = request
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect::<Vec<_>>();
    let mut body = json!({
        "model": request.model,
        "messages": messages,
    });

    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    if request.json_mode {
        body["response_format"] = json!({
            "type": "json_object",
        });
    }

    body
}

fn parse_chat_response(raw: &str) -> Result<ChatResponse, DigestAiError> {
    let parsed: OpenAiChatResponse = serde_json::from_str(raw)?;
    let choice =
        parsed.choices.into_iter().next().ok_or_else(|| {
            DigestAiError::InvalidResponse("response contained no choices".to_string())
        })?;

    let text = flatten_openai_content(choice.message.content.as_ref());
    if text.trim().is_empty() {
        return Err(DigestAiError::InvalidResponse(
            "response choice has no text content".to_string(),
        ));
    }

    let usage = parsed
        .usage
        .map(|usage| ChatUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        message: Message::assistant(text),
        finish_reason: choice.finish_reason,
        usage,
    })
}

// Some compatible providers return `content` as an array of typed parts.
fn flatten_openai_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text.as_str()),
                Value::Object(map) => map.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}
