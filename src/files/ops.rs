use crate::exec::{CommandResult, ExecError};
use crate::files::PathAuthority;
use crate::security::CommandValidator;
use std::fs;
use std::path::Path;

/// Creates and overwrites small text files under policy: target directory
/// must exist and be writable, names and content pass through the
/// validator's sanitizers.
///
/// Writes are not transactional; a crash mid-write leaves a partial file.
/// Accepted for a tool that only produces small text artifacts.
#[derive(Debug, Clone)]
pub struct FileOps {
    authority: PathAuthority,
    validator: CommandValidator,
}

impl FileOps {
    pub fn new(validator: CommandValidator) -> Self {
        Self {
            authority: PathAuthority::new(),
            validator,
        }
    }

    /// Create a text file under `directory`, overwriting any existing file.
    ///
    /// The filename is sanitized and given a `.txt` suffix when it does not
    /// already end in one; the content is sanitized before writing.
    pub fn create_text_file(
        &self,
        directory: &Path,
        filename: &str,
        content: &str,
        command: &str,
    ) -> CommandResult {
        if !directory.exists() {
            return CommandResult::fail(
                command,
                ExecError::NotFound(format!("directory not found: {}", directory.display())),
            );
        }

        if !self.authority.has_write_permission(directory) {
            return CommandResult::fail(
                command,
                ExecError::PermissionDenied(format!(
                    "cannot create file in: {}",
                    directory.display()
                )),
            );
        }

        let mut safe_filename = self.validator.sanitize_path(filename);
        if !safe_filename.ends_with(".txt") {
            safe_filename.push_str(".txt");
        }

        let file_path = directory.join(&safe_filename);
        let safe_content = self.validator.sanitize(content);

        match fs::write(&file_path, safe_content) {
            Ok(()) => CommandResult::ok(
                format!("file created: {}", file_path.display()),
                command,
            ),
            Err(e) => CommandResult::fail(command, ExecError::Unexpected(e.to_string())),
        }
    }

    /// Write sanitized content to an exact path, overwriting. The parent
    /// directory must already exist; it is never created here.
    pub fn write_to_file(&self, path: &Path, content: &str, command: &str) -> CommandResult {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        if !parent.exists() {
            return CommandResult::fail(
                command,
                ExecError::NotFound(format!("directory not found: {}", parent.display())),
            );
        }

        if !self.authority.has_write_permission(parent) {
            return CommandResult::fail(
                command,
                ExecError::PermissionDenied(format!("cannot write to: {}", path.display())),
            );
        }

        let safe_content = self.validator.sanitize(content);

        match fs::write(path, safe_content) {
            Ok(()) => CommandResult::ok(
                format!("content written to: {}", path.display()),
                command,
            ),
            Err(e) => CommandResult::fail(command, ExecError::Unexpected(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ops() -> FileOps {
        FileOps::new(CommandValidator::new())
    }

    #[test]
    fn test_create_text_file() {
        let temp = TempDir::new().unwrap();
        let result = ops().create_text_file(temp.path(), "notes.txt", "hello", "echo hello > notes.txt");

        assert!(result.success, "unexpected failure: {:?}", result.error);
        assert!(result.output.contains("notes.txt"));
        assert_eq!(fs::read_to_string(temp.path().join("notes.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_create_text_file_forces_txt_suffix() {
        let temp = TempDir::new().unwrap();
        let result = ops().create_text_file(temp.path(), "notes", "hi", "cmd");

        assert!(result.success);
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn test_create_text_file_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let result = ops().create_text_file(&missing, "a.txt", "x", "cmd");

        assert!(!result.success);
        assert!(matches!(result.error, Some(ExecError::NotFound(_))));
    }

    #[test]
    fn test_create_text_file_sanitizes_content() {
        let temp = TempDir::new().unwrap();
        let result = ops().create_text_file(temp.path(), "a.txt", "hi; rm & x | y", "cmd");

        assert!(result.success);
        let written = fs::read_to_string(temp.path().join("a.txt")).unwrap();
        assert!(!written.contains(';'));
        assert!(!written.contains('&'));
        assert!(!written.contains('|'));
    }

    #[test]
    fn test_create_text_file_sanitizes_filename_traversal() {
        let temp = TempDir::new().unwrap();
        let result = ops().create_text_file(temp.path(), "../escape.txt", "x", "cmd");

        assert!(result.success);
        assert!(temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_write_to_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.txt");

        let first = ops().write_to_file(&target, "first", "cmd");
        assert!(first.success);
        let second = ops().write_to_file(&target, "second", "cmd");
        assert!(second.success);

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_write_to_file_missing_parent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nope").join("out.txt");
        let result = ops().write_to_file(&target, "x", "cmd");

        assert!(!result.success);
        assert!(matches!(result.error, Some(ExecError::NotFound(_))));
    }
}
