//! Chat-completion surface used by the report synthesizer.
mod openai;
mod types;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{
    ChatRequest, ChatResponse, ChatUsage, DigestAiError, LlmClient, Message, MessageRole,
};
