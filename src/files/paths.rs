use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolves and authorizes filesystem targets: home directory lookup,
/// directory creation, and write-permission checks.
#[derive(Debug, Clone, Default)]
pub struct PathAuthority;

impl PathAuthority {
    pub fn new() -> Self {
        Self
    }

    /// The invoking user's home directory, from `$HOME`.
    pub fn user_home() -> io::Result<PathBuf> {
        std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set"))
    }

    /// The user's `Documents` directory.
    pub fn documents_dir() -> io::Result<PathBuf> {
        Ok(Self::user_home()?.join("Documents"))
    }

    /// Create a directory and all missing parents. Idempotent: succeeds if
    /// the directory already exists. Returns false on any OS error instead
    /// of propagating.
    pub fn ensure_directory(&self, path: &Path) -> bool {
        match fs::create_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("failed to create directory {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Check write access on the PARENT of the given path.
    ///
    /// The common caller question is "can I create something inside this
    /// directory", so the check deliberately targets the parent, not the
    /// path itself.
    pub fn has_write_permission(&self, path: &Path) -> bool {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let metadata = match fs::metadata(parent) {
            Ok(m) => m,
            Err(_) => return false,
        };

        if metadata.permissions().readonly() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o222 == 0 {
                return false;
            }
        }

        true
    }
}
