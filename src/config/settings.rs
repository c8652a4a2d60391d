use crate::security::{
    ALLOWED_BASE_COMMANDS, ALLOWED_FILE_EXTENSIONS, BLOCKED_TOKENS, SecurityPolicy,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub behavior: BehaviorConfig,
    pub exec: ExecConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BehaviorConfig {
    pub confirm_before_execute: bool,
    pub log_commands: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExecConfig {
    pub timeout_seconds: u64,
}

/// Policy tables, read once at startup. Mid-run they are frozen inside the
/// validator; editing the file takes effect on the next start.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    pub blocked_tokens: Vec<String>,
    pub allowed_commands: Vec<String>,
    pub allowed_extensions: Vec<String>,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("shellm"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default_config());
        }

        let contents = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self)?;

        fs::write(&path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            llm: LLMConfig {
                provider: "ollama".to_string(),
                model: "llama3.2".to_string(),
                base_url: "http://localhost:11434".to_string(),
            },
            behavior: BehaviorConfig {
                confirm_before_execute: true,
                log_commands: true,
            },
            exec: ExecConfig {
                timeout_seconds: 30,
            },
            security: SecurityConfig {
                blocked_tokens: BLOCKED_TOKENS.iter().map(|s| s.to_string()).collect(),
                allowed_commands: ALLOWED_BASE_COMMANDS.iter().map(|s| s.to_string()).collect(),
                allowed_extensions: ALLOWED_FILE_EXTENSIONS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }

    /// Build the immutable security policy from the configured lists.
    pub fn security_policy(&self) -> SecurityPolicy {
        SecurityPolicy::from_lists(
            &self.security.blocked_tokens,
            &self.security.allowed_commands,
            &self.security.allowed_extensions,
        )
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider != "ollama" {
            return Err(ConfigError::InvalidValue(format!(
                "Unsupported LLM provider: {}. Only 'ollama' is supported in v1",
                self.llm.provider
            )));
        }

        if self.llm.model.is_empty() {
            return Err(ConfigError::InvalidValue(
                "model must not be empty".to_string(),
            ));
        }

        if self.exec.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.security.allowed_commands.is_empty() {
            return Err(ConfigError::InvalidValue(
                "allowed_commands must not be empty".to_string(),
            ));
        }

        for ext in &self.security.allowed_extensions {
            if !ext.starts_with('.') {
                return Err(ConfigError::InvalidValue(format!(
                    "extension must start with '.': {ext}"
                )));
            }
        }

        Ok(())
    }
}
