//! Resolution of user supplied path patterns into a single file.
//!
//! Only the first match of a pattern is ever used. Literal brackets are
//! escaped before expansion so that names like `Movie [1080p].mkv` match
//! themselves instead of being read as a character class.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder used while rewriting `[` so the `]` pass doesn't touch it
const BRACKET_PLACEHOLDER: &str = "#TEMP#";

/// Host flavour that decides how a pattern is escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Backslash separated paths; only brackets are escaped
    Windows,
    /// Everything else; all glob metacharacters are escaped
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Outcome of resolving one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// First match, known to be a regular file
    Found(PathBuf),
    /// The named path (or the first match) is not an existing file
    Missing(String),
    /// Nothing matched at all
    NoMatch,
}

/// Rewrite `pattern` so glob expansion treats special characters literally.
pub fn escape_glob_pattern(pattern: &str, platform: Platform) -> String {
    match platform {
        Platform::Windows => pattern
            .replace('[', BRACKET_PLACEHOLDER)
            .replace(']', "[]]")
            .replace(BRACKET_PLACEHOLDER, "[[]"),
        Platform::Unix => glob::Pattern::escape(pattern),
    }
}

fn has_wildcards(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Resolve `pattern` to at most one file.
pub fn resolve_pattern(pattern: &str, platform: Platform) -> PathResolution {
    if pattern.is_empty() {
        return PathResolution::NoMatch;
    }

    let mut missing = None;
    if !has_wildcards(pattern) && !Path::new(pattern).is_file() {
        missing = Some(pattern.to_string());
    }

    let escaped = escape_glob_pattern(pattern, platform);
    debug!("Expanding pattern {:?} as {:?}", pattern, escaped);

    let first_match = match glob::glob(&escaped) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).next(),
        Err(e) => {
            warn!("Invalid path pattern {:?}: {}", pattern, e);
            None
        }
    };

    match first_match {
        Some(path) if path.is_file() => PathResolution::Found(path),
        Some(path) => PathResolution::Missing(path.display().to_string()),
        None => match missing {
            Some(path) => PathResolution::Missing(path),
            None => PathResolution::NoMatch,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_escape_windows_brackets() {
        assert_eq!(
            escape_glob_pattern(r"C:\Videos\Movie [1080p].mkv", Platform::Windows),
            r"C:\Videos\Movie [[]1080p[]].mkv"
        );
        assert_eq!(escape_glob_pattern("a]b[c", Platform::Windows), "a[]]b[[]c");
    }

    #[test]
    fn test_escape_windows_keeps_wildcards() {
        assert_eq!(escape_glob_pattern("*.mp4", Platform::Windows), "*.mp4");
        assert_eq!(escape_glob_pattern("clip?.srt", Platform::Windows), "clip?.srt");
    }

    #[test]
    fn test_escape_unix_escapes_everything() {
        assert_eq!(escape_glob_pattern("plain.mp4", Platform::Unix), "plain.mp4");
        assert_eq!(
            escape_glob_pattern("Movie [1080p].mkv", Platform::Unix),
            "Movie [[]1080p[]].mkv"
        );
        assert_eq!(escape_glob_pattern("*.mp4", Platform::Unix), "[*].mp4");
        assert_eq!(escape_glob_pattern("a?.srt", Platform::Unix), "a[?].srt");
    }

    #[test]
    fn test_empty_pattern_is_no_match() {
        assert_eq!(resolve_pattern("", Platform::current()), PathResolution::NoMatch);
    }

    #[test]
    fn test_literal_file_is_found() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Movie [1080p].mkv");
        file.write_str("data").unwrap();

        let pattern = file.path().to_string_lossy().to_string();
        assert_eq!(
            resolve_pattern(&pattern, Platform::current()),
            PathResolution::Found(file.path().to_path_buf())
        );
    }

    #[test]
    fn test_missing_literal_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let pattern = temp.child("absent.mp4").path().to_string_lossy().to_string();

        assert_eq!(
            resolve_pattern(&pattern, Platform::current()),
            PathResolution::Missing(pattern.clone())
        );
    }

    #[test]
    fn test_directory_is_missing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dir = temp.child("folder");
        dir.create_dir_all().unwrap();

        let pattern = dir.path().to_string_lossy().to_string();
        assert_eq!(
            resolve_pattern(&pattern, Platform::current()),
            PathResolution::Missing(pattern.clone())
        );
    }

    #[test]
    fn test_wildcard_without_matches_is_no_match() {
        let temp = assert_fs::TempDir::new().unwrap();
        let pattern = temp.path().join("*.nothing").to_string_lossy().to_string();

        assert_eq!(resolve_pattern(&pattern, Platform::current()), PathResolution::NoMatch);
    }
}
