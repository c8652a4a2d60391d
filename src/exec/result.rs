use thiserror::Error;

/// Why a command was refused or failed.
///
/// Every internal fault is classified into one of these kinds at the
/// boundary of the operation that can name it; nothing crosses the executor
/// boundary as a raw error or panic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecError {
    #[error("command blocked for security reasons: {0}")]
    SecurityBlocked(String),

    #[error("invalid command syntax: {0}")]
    InvalidSyntax(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("file extension not allowed: {0}")]
    ExtensionNotAllowed(String),

    #[error("execution failed: {0}")]
    ExecutionFailure(String),

    #[error("command timed out after {0}s")]
    Timeout(u64),

    #[error("no previous command to undo")]
    NoHistory,

    #[error("undo not supported for command: {0}")]
    Unsupported(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ExecError {
    /// Short stable name of the error kind, used by the audit log.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::SecurityBlocked(_) => "security-blocked",
            ExecError::InvalidSyntax(_) => "invalid-syntax",
            ExecError::NotFound(_) => "not-found",
            ExecError::PermissionDenied(_) => "permission-denied",
            ExecError::ExtensionNotAllowed(_) => "extension-not-allowed",
            ExecError::ExecutionFailure(_) => "execution-failure",
            ExecError::Timeout(_) => "timeout",
            ExecError::NoHistory => "no-history",
            ExecError::Unsupported(_) => "unsupported",
            ExecError::Unexpected(_) => "unexpected",
        }
    }
}

/// Outcome of one execute or undo operation.
///
/// Invariant: `error` is `Some` if and only if `success` is false. The
/// constructors are the only way callers build one, so the invariant holds
/// by construction.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
    pub command: String,
    pub error: Option<ExecError>,
}

impl CommandResult {
    pub fn ok(output: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            command: command.into(),
            error: None,
        }
    }

    pub fn fail(command: impl Into<String>, error: ExecError) -> Self {
        Self {
            success: false,
            output: String::new(),
            command: command.into(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_has_no_error() {
        let result = CommandResult::ok("done", "mkdir /tmp/x");
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.command, "mkdir /tmp/x");
    }

    #[test]
    fn test_fail_carries_error() {
        let result = CommandResult::fail("rm -rf /", ExecError::SecurityBlocked("rm".into()));
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.output.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ExecError::Timeout(30);
        assert_eq!(err.to_string(), "command timed out after 30s");
        assert_eq!(err.kind(), "timeout");
    }
}
