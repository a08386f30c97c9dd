//! Trigger detection for one path mapping.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use docdrop_core::PatternSpec;

use crate::error::DeliveryError;
use crate::glob::FileListing;

/// Result of scanning a mapping's local root for trigger files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// No trigger present; the mapping has nothing to do this run.
    Skip,
    /// Absolute trigger paths, in scan order.
    Proceed(Vec<PathBuf>),
}

/// Find every trigger file under `local`.
///
/// A lone pattern string is treated as a one-element list. Patterns are
/// applied in order and their results unioned.
pub fn scan(local: &Path, triggers: &PatternSpec) -> Result<ScanOutcome, DeliveryError> {
    let patterns = triggers.patterns("trigger")?;
    let listing = FileListing::read(local, &patterns)?;

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for pattern in &patterns {
        let matches = listing.matching(pattern)?;
        tracing::info!(
            pattern = %pattern,
            count = matches.len(),
            directory = %local.display(),
            "found trigger file(s)",
        );
        for rel in matches {
            if seen.insert(rel.clone()) {
                found.push(local.join(rel));
            }
        }
    }

    if found.is_empty() {
        Ok(ScanOutcome::Skip)
    } else {
        Ok(ScanOutcome::Proceed(found))
    }
}

/// Distinct parent directories of `triggers`, in first-seen order.
pub fn trigger_directories(triggers: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    triggers
        .iter()
        .filter_map(|t| t.parent())
        .filter(|dir| seen.insert(dir.to_path_buf()))
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use docdrop_core::ConfigError;
    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn no_triggers_is_skip() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "a/report.pdf");
        let outcome = scan(root.path(), &PatternSpec::from("**/*.trigger")).unwrap();
        assert_eq!(outcome, ScanOutcome::Skip);
    }

    #[test]
    fn finds_triggers_across_directories() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "a/ready.trigger");
        touch(root.path(), "b/ready.trigger");
        touch(root.path(), "b/report.pdf");
        let outcome = scan(root.path(), &PatternSpec::from("*/*.trigger")).unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Proceed(vec![
                root.path().join("a/ready.trigger"),
                root.path().join("b/ready.trigger"),
            ])
        );
    }

    #[test]
    fn pattern_list_is_unioned() {
        let root = TempDir::new().unwrap();
        touch(root.path(), "a/go.trigger");
        touch(root.path(), "a/DONE");
        let spec = PatternSpec::from(vec!["*/DONE", "*/*.trigger", "a/*"]);
        let ScanOutcome::Proceed(found) = scan(root.path(), &spec).unwrap() else {
            panic!("expected triggers");
        };
        assert_eq!(
            found,
            vec![root.path().join("a/DONE"), root.path().join("a/go.trigger")]
        );
    }

    #[test]
    fn malformed_spec_is_config_error() {
        let root = TempDir::new().unwrap();
        let spec = PatternSpec::Malformed(Default::default());
        let err = scan(root.path(), &spec).unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Config(ConfigError::InvalidPatterns { field: "trigger", .. })
        ));
    }

    #[test]
    fn directories_are_deduplicated() {
        let triggers = vec![
            PathBuf::from("/in/a/one.trigger"),
            PathBuf::from("/in/b/x.trigger"),
            PathBuf::from("/in/a/two.trigger"),
        ];
        assert_eq!(
            trigger_directories(&triggers),
            vec![PathBuf::from("/in/a"), PathBuf::from("/in/b")]
        );
    }
}
