use crate::llm::context::PromptContext;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while consulting the language model
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A shell command proposed by the model, before any validation
#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub command: String,
}

/// Trait for model backends that turn a natural-language intent into a
/// shell command. Implementations carry a bounded-time contract: they
/// return within their configured timeout or fail with `Timeout`.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn propose(&self, query: &str, context: &PromptContext)
        -> Result<ShellCommand, LLMError>;
}
