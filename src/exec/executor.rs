use crate::exec::{CommandResult, ExecError};
use crate::files::{FileOps, PathAuthority};
use crate::security::CommandValidator;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes a sanitized command to a specialized handler or a sandboxed
/// subprocess, records an undo journal, and reverses the most recent entry
/// on request.
///
/// Single-threaded by contract: one command is fully validated, executed and
/// journaled before the next is accepted, so the journal needs no locking.
pub struct Executor {
    validator: CommandValidator,
    authority: PathAuthority,
    files: FileOps,
    journal: Vec<String>,
    timeout: Duration,
}

impl Executor {
    pub fn new(validator: CommandValidator) -> Self {
        Self::with_timeout(validator, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(validator: CommandValidator, timeout: Duration) -> Self {
        Self {
            files: FileOps::new(validator.clone()),
            authority: PathAuthority::new(),
            validator,
            journal: Vec::new(),
            timeout,
        }
    }

    /// Number of journaled commands available to undo.
    pub fn history_len(&self) -> usize {
        self.journal.len()
    }

    /// Sanitize, classify and run one raw command.
    ///
    /// Dispatch priority: `echo` with redirection, then `mkdir`, then
    /// `touch`, then the generic subprocess path behind the `is_safe` gate.
    /// The sanitized command is journaled only when the outcome is success.
    pub async fn execute(&mut self, raw_command: &str) -> CommandResult {
        let command = self.validator.sanitize(raw_command);

        let result = if command.starts_with("echo") && command.contains('>') {
            self.handle_echo(&command)
        } else if command.starts_with("mkdir") {
            self.handle_mkdir(&command)
        } else if command.starts_with("touch") {
            self.handle_touch(&command)
        } else {
            self.run_subprocess(&command).await
        };

        if result.success {
            self.journal.push(command);
        }

        result
    }

    /// Reverse the most recent journaled command, one level deep.
    ///
    /// The entry is consumed even when reversal fails or is unsupported;
    /// there is no redo and no retry.
    pub fn undo(&mut self) -> CommandResult {
        let Some(last_command) = self.journal.pop() else {
            return CommandResult::fail("", ExecError::NoHistory);
        };

        let tokens: Vec<&str> = last_command.split_whitespace().collect();
        let base = tokens.first().copied().unwrap_or("");
        let target = tokens.last().copied().unwrap_or("");

        match base {
            "mkdir" => match fs::remove_dir_all(target) {
                Ok(()) => {
                    CommandResult::ok(format!("directory removed: {target}"), last_command.as_str())
                }
                Err(e) => CommandResult::fail(last_command.as_str(), io_error_kind(e, target)),
            },
            "touch" => match fs::remove_file(target) {
                Ok(()) => CommandResult::ok(format!("file removed: {target}"), last_command.as_str()),
                Err(e) => CommandResult::fail(last_command.as_str(), io_error_kind(e, target)),
            },
            _ => CommandResult::fail(last_command.as_str(), ExecError::Unsupported(base.to_string())),
        }
    }

    /// `echo <content> > <path>`: everything left of the first `>` (minus
    /// the `echo` keyword) is content, everything right of it is the target.
    fn handle_echo(&self, command: &str) -> CommandResult {
        let Some((left, right)) = command.split_once('>') else {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("echo requires a '>' redirection target".to_string()),
            );
        };

        let content = trim_quotes(left.replacen("echo", "", 1).trim()).to_string();
        let target = self.validator.sanitize_path(right);

        if target.is_empty() {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("missing redirection target".to_string()),
            );
        }

        self.files.write_to_file(Path::new(&target), &content, command)
    }

    /// `mkdir <path>`: the last token names the directory. `~` expands to
    /// the home directory; relative paths resolve against the cwd.
    fn handle_mkdir(&self, command: &str) -> CommandResult {
        let Some(tokens) = shlex::split(command) else {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("unbalanced quoting".to_string()),
            );
        };
        if tokens.len() < 2 {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("mkdir requires a directory argument".to_string()),
            );
        }

        let dir_name = &tokens[tokens.len() - 1];
        let path = match self.expand_dir_path(dir_name) {
            Ok(p) => p,
            Err(e) => return CommandResult::fail(command, ExecError::Unexpected(e.to_string())),
        };

        if !self.authority.has_write_permission(&path) {
            return CommandResult::fail(
                command,
                ExecError::PermissionDenied(format!(
                    "cannot create directory in: {}",
                    path.display()
                )),
            );
        }

        if self.authority.ensure_directory(&path) {
            CommandResult::ok(format!("directory created: {}", path.display()), command)
        } else {
            CommandResult::fail(
                command,
                ExecError::ExecutionFailure(format!(
                    "could not create directory: {}",
                    path.display()
                )),
            )
        }
    }

    /// `touch <path>`: creates an empty file with an allow-listed suffix.
    /// Unlike mkdir, no `~` expansion happens here.
    fn handle_touch(&self, command: &str) -> CommandResult {
        let Some(tokens) = shlex::split(command) else {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("unbalanced quoting".to_string()),
            );
        };
        if tokens.len() < 2 {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("touch requires a file argument".to_string()),
            );
        }

        let file_name = &tokens[tokens.len() - 1];
        let full_path = if Path::new(file_name).is_absolute() {
            PathBuf::from(file_name)
        } else {
            match env::current_dir() {
                Ok(cwd) => cwd.join(file_name),
                Err(e) => {
                    return CommandResult::fail(command, ExecError::Unexpected(e.to_string()));
                }
            }
        };

        if !self.authority.has_write_permission(&full_path) {
            return CommandResult::fail(
                command,
                ExecError::PermissionDenied(format!(
                    "cannot create file at: {}",
                    full_path.display()
                )),
            );
        }

        if !self
            .validator
            .is_allowed_extension(&full_path.to_string_lossy())
        {
            return CommandResult::fail(
                command,
                ExecError::ExtensionNotAllowed(format!(
                    "allowed extensions: {}",
                    allowed_extensions_list(&self.validator)
                )),
            );
        }

        // create without truncating an existing file, matching touch(1)
        match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full_path)
        {
            Ok(_) => CommandResult::ok(format!("file created: {}", full_path.display()), command),
            Err(e) => CommandResult::fail(
                command,
                ExecError::ExecutionFailure(format!("could not create file: {e}")),
            ),
        }
    }

    /// Generic path: reject up front unless the validator accepts the
    /// command, then spawn it directly (no shell) under a hard wall-clock
    /// timeout. No subprocess is ever spawned for a rejected command.
    async fn run_subprocess(&self, command: &str) -> CommandResult {
        if !self.validator.is_safe(command) {
            return CommandResult::fail(
                command,
                ExecError::SecurityBlocked(
                    "command is not on the allow-list or contains a blocked token".to_string(),
                ),
            );
        }

        let Some(args) = shlex::split(command) else {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("unbalanced quoting".to_string()),
            );
        };
        let Some((program, rest)) = args.split_first() else {
            return CommandResult::fail(
                command,
                ExecError::InvalidSyntax("empty command".to_string()),
            );
        };

        let mut child = Command::new(program);
        child.args(rest).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, child.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return CommandResult::fail(
                    command,
                    ExecError::ExecutionFailure(format!("failed to spawn '{program}': {e}")),
                );
            }
            // child is killed on drop; partial output is discarded
            Err(_) => {
                return CommandResult::fail(command, ExecError::Timeout(self.timeout.as_secs()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            CommandResult::ok(stdout, command)
        } else {
            let mut result = CommandResult::fail(
                command,
                ExecError::ExecutionFailure(stderr.trim().to_string()),
            );
            // non-zero exit still surfaces whatever the command printed
            result.output = stdout;
            result
        }
    }

    fn expand_dir_path(&self, dir_name: &str) -> io::Result<PathBuf> {
        if let Some(suffix) = dir_name.strip_prefix('~') {
            let home = PathAuthority::user_home()?;
            return Ok(home.join(suffix.trim_start_matches('/')));
        }
        let path = Path::new(dir_name);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(env::current_dir()?.join(path))
        }
    }
}

fn trim_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

fn io_error_kind(e: io::Error, target: &str) -> ExecError {
    match e.kind() {
        io::ErrorKind::NotFound => ExecError::NotFound(target.to_string()),
        io::ErrorKind::PermissionDenied => ExecError::PermissionDenied(target.to_string()),
        _ => ExecError::Unexpected(e.to_string()),
    }
}

fn allowed_extensions_list(validator: &CommandValidator) -> String {
    let mut extensions: Vec<&str> = validator
        .policy()
        .allowed_extensions
        .iter()
        .map(String::as_str)
        .collect();
    extensions.sort_unstable();
    extensions.join(", ")
}
