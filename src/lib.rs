pub mod audit;
pub mod config;
pub mod error;
pub mod exec;
pub mod files;
pub mod llm;
pub mod security;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use exec::{CommandResult, ExecError, Executor};
pub use security::{CommandValidator, SecurityPolicy};
