pub mod validator;

pub use validator::CommandValidator;

use std::collections::HashSet;

/// Tokens that may never appear in a command, in any argument position.
///
/// This list is checked against every whitespace-separated token, not just
/// the command name, so a blocked word used as a filename argument is also
/// rejected. Adding or removing an entry requires careful security review.
pub const BLOCKED_TOKENS: &[&str] = &["rm", "mkfs", "dd", ":(){:|:&};:", "mv", "chmod"];

/// Command names permitted as the first token of a command.
pub const ALLOWED_BASE_COMMANDS: &[&str] = &["touch", "echo", "mkdir"];

/// File suffixes permitted for any file created or written.
pub const ALLOWED_FILE_EXTENSIONS: &[&str] = &[".txt", ".md", ".csv"];

/// Immutable security policy handed to the validator at construction.
///
/// Frozen for the process lifetime: overrides come from the config file at
/// startup, never from mid-run mutation.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    pub blocked_tokens: HashSet<String>,
    pub allowed_base_commands: HashSet<String>,
    pub allowed_extensions: HashSet<String>,
}

impl SecurityPolicy {
    pub fn from_lists(blocked: &[String], allowed: &[String], extensions: &[String]) -> Self {
        Self {
            blocked_tokens: blocked.iter().cloned().collect(),
            allowed_base_commands: allowed.iter().cloned().collect(),
            allowed_extensions: extensions.iter().cloned().collect(),
        }
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            blocked_tokens: BLOCKED_TOKENS.iter().map(|s| s.to_string()).collect(),
            allowed_base_commands: ALLOWED_BASE_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions: ALLOWED_FILE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
