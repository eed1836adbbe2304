use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Speaker of a chat turn.
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One chat turn sent to or received from a completion service.
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ChatRequest` used by completion clients.
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Ask the provider for a bare JSON object reply.
    pub json_mode: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub message: Message,
    pub finish_reason: Option<String>,
    pub usage: ChatUsage,
}

#[derive(Debug, Error)]
/// Failures from a completion client.
pub enum DigestAiError {
    #[error("completion API key is not configured")]
    MissingApiKey,
    #[error("completion transport failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion service answered {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to decode completion payload: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unusable completion reply: {0}")]
    InvalidResponse(String),
}

#[async_trait]
/// Trait contract for a structured-completion service.
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, DigestAiError>;
}
