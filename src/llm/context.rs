use crate::files::PathAuthority;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MAX_DIRECTORIES: usize = 100;
const DEFAULT_SCAN_DEPTH: usize = 1;

/// Filesystem context handed to the model alongside the user's query: the
/// base directory and the directories visible under it.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub base_dir: PathBuf,
    pub directories: Vec<String>,
}

impl PromptContext {
    /// Render the context block of the prompt.
    pub fn render(&self) -> String {
        format!(
            "Base directory: {}\nAvailable directories:\n{}",
            self.base_dir.display(),
            self.directories.join("\n")
        )
    }
}

/// Builds a `PromptContext` by scanning the user's home directory up to a
/// bounded depth, capped at 100 entries so the prompt stays small.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    scan_depth: usize,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            scan_depth: DEFAULT_SCAN_DEPTH,
        }
    }

    pub fn with_depth(scan_depth: usize) -> Self {
        Self { scan_depth }
    }

    /// Build a context rooted at the user's home directory. Scan errors
    /// degrade to an empty directory listing rather than failing the
    /// translation.
    pub fn build(&self) -> io::Result<PromptContext> {
        let base_dir = PathAuthority::user_home()?;
        let directories = self.list_directories(&base_dir);
        Ok(PromptContext {
            base_dir,
            directories,
        })
    }

    /// List directories under `base` up to the configured depth. Unreadable
    /// subtrees are skipped silently.
    pub fn list_directories(&self, base: &Path) -> Vec<String> {
        let mut directories = vec![base.display().to_string()];
        self.walk(base, 0, &mut directories);
        directories.truncate(MAX_DIRECTORIES);
        directories
    }

    fn walk(&self, dir: &Path, depth: usize, out: &mut Vec<String>) {
        if depth >= self.scan_depth || out.len() >= MAX_DIRECTORIES {
            return;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            if out.len() >= MAX_DIRECTORIES {
                return;
            }
            let path = entry.path();
            if path.is_dir() {
                out.push(path.display().to_string());
                self.walk(&path, depth + 1, out);
            }
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
