//! Glob matching against a base directory.
//!
//! Patterns are matched against `/`-separated paths relative to the base:
//! - `*` and `?` stay within one path segment; `**` spans segments
//! - brace sets (`*.{pdf,tif}`) and character classes (`[0-9]`) are supported
//! - only regular files are returned, never directories
//! - a leading `./` is ignored, so `./*.pdf` is the same as `*.pdf`
//! - a path segment starting with `.` is only matched by a pattern that spells
//!   out the leading dot (`.done`, `**/.trigger`), so stray dotfiles are not
//!   picked up by `*`
//!
//! The base is listed once per [`FileListing`]; entries are sorted by file name
//! so results are deterministic across runs. An unreadable base is an error;
//! an unreadable directory below it is logged and skipped.

use std::collections::HashSet;
use std::path::Path;

use globset::{Glob, GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::error::DeliveryError;

/// Regular files under a base directory, as relative `/`-separated paths.
#[derive(Debug, Clone)]
pub struct FileListing {
    files: Vec<String>,
}

impl FileListing {
    /// List `base` deeply enough to evaluate every pattern in `patterns`.
    ///
    /// Fails with [`DeliveryError::Unreadable`] if `base` cannot be read.
    /// Subdirectories that cannot be read are skipped with a warning.
    pub fn read(base: &Path, patterns: &[String]) -> Result<Self, DeliveryError> {
        let mut walker = WalkDir::new(base)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(depth) = required_depth(patterns) {
            walker = walker.max_depth(depth);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) if source.depth() == 0 => {
                    return Err(DeliveryError::Unreadable {
                        path: source.path().unwrap_or(base).to_path_buf(),
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        path = %err.path().unwrap_or(base).display(),
                        error = %err,
                        "skipping unreadable entry",
                    );
                    continue;
                }
            };
            if !entry.path().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(base) else {
                continue;
            };
            files.push(to_slash(rel));
        }

        Ok(Self { files })
    }

    /// Files matching a single pattern, in listing order.
    pub fn matching(&self, pattern: &str) -> Result<Vec<String>, DeliveryError> {
        let pattern = normalize(pattern);
        let matcher = compile(pattern)?;
        let dot_ok = names_dot_segment(pattern);
        Ok(self
            .files
            .iter()
            .filter(|rel| dot_ok || !has_dot_segment(rel))
            .filter(|rel| matcher.is_match(rel.as_str()))
            .cloned()
            .collect())
    }

    /// Union of the files matching each pattern, pattern by pattern.
    ///
    /// First-seen order is kept; a file matched by several patterns appears once.
    pub fn matching_any(&self, patterns: &[String]) -> Result<Vec<String>, DeliveryError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for pattern in patterns {
            for rel in self.matching(pattern)? {
                if seen.insert(rel.clone()) {
                    out.push(rel);
                }
            }
        }
        Ok(out)
    }
}

/// Relative paths of the files under `base` matching any of `patterns`.
pub fn match_patterns(base: &Path, patterns: &[String]) -> Result<Vec<String>, DeliveryError> {
    FileListing::read(base, patterns)?.matching_any(patterns)
}

fn compile(pattern: &str) -> Result<GlobMatcher, DeliveryError> {
    let glob: Glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| DeliveryError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(glob.compile_matcher())
}

/// Deepest level any pattern can reach, or `None` if one of them uses `**`.
fn required_depth(patterns: &[String]) -> Option<usize> {
    let mut depth = 1;
    for pattern in patterns {
        let pattern = normalize(pattern);
        if pattern.contains("**") {
            return None;
        }
        depth = depth.max(pattern.trim_matches('/').split('/').count());
    }
    Some(depth)
}

fn normalize(pattern: &str) -> &str {
    pattern.trim_start_matches("./")
}

fn to_slash(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_dot_segment(rel: &str) -> bool {
    rel.split('/').any(|segment| segment.starts_with('.'))
}

fn names_dot_segment(pattern: &str) -> bool {
    pattern.split('/').any(|segment| segment.starts_with('.'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
