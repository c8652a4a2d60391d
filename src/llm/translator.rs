use crate::llm::client::{LLMClient, LLMError, ShellCommand};
use crate::llm::context::ContextBuilder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Context building error: {0}")]
    ContextError(#[from] std::io::Error),
}

/// Turns a natural-language intent into a proposed shell command: builds
/// the filesystem context, consults the model, returns the raw proposal.
/// Validation happens later, in the executor.
pub struct Translator {
    client: Box<dyn LLMClient>,
    context_builder: ContextBuilder,
}

impl Translator {
    pub fn new(client: Box<dyn LLMClient>, context_builder: ContextBuilder) -> Self {
        Self {
            client,
            context_builder,
        }
    }

    pub async fn translate(&self, query: &str) -> Result<ShellCommand, TranslationError> {
        let context = self.context_builder.build()?;
        let command = self.client.propose(query, &context).await?;
        Ok(command)
    }
}
