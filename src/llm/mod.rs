pub mod client;
pub mod context;
pub mod ollama;
pub mod translator;

pub use client::{LLMClient, LLMError, ShellCommand};
pub use context::{ContextBuilder, PromptContext};
pub use ollama::OllamaClient;
pub use translator::Translator;
