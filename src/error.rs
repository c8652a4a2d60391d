use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::client::LLMError;
use crate::llm::translator::TranslationError;

/// Top-level application error that wraps all module-specific errors
///
/// This provides a unified error type for application-level code while
/// preserving the specific error context from each module. Note that the
/// executor never produces one of these: its public operations return
/// `CommandResult` values instead of raw errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
