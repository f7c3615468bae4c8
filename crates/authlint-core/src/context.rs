//! Context types for rule execution.

use std::path::{Path, PathBuf};

/// Context provided to per-file rules.
///
/// Carries the file identity and contents for a single file pass. A fresh
/// context is built for every file; nothing in it outlives the pass.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as given to the analyzer.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Returns true if the file path ends with `suffix`.
    ///
    /// `suffix` is written with `/` separators and is matched against both
    /// `/` and `\` spellings of the path.
    #[must_use]
    pub fn path_ends_with(&self, suffix: &str) -> bool {
        path_ends_with(&self.path.to_string_lossy(), suffix)
    }

    /// Returns true for files that should be parsed with the TSX dialect.
    #[must_use]
    pub fn is_jsx(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("tsx" | "jsx")
        )
    }
}

/// Suffix match on a path string under both separator conventions.
#[must_use]
pub fn path_ends_with(path: &str, suffix: &str) -> bool {
    if suffix.is_empty() {
        return false;
    }
    path.ends_with(suffix) || path.ends_with(&suffix.replace('/', "\\"))
}
