//! Config file discovery, loading and validation.
//!
//! # Lookup order
//!
//! 1. an explicit path (`--config`)
//! 2. `$DOCDROP_CONFIG`
//! 3. `<home>/.docdrop/config.yaml`
//!
//! # API pattern
//!
//! As elsewhere in the workspace, functions that depend on the home directory
//! come in two forms: `fn_at(home: &Path, …)` for tests with `TempDir`, and
//! `fn(…)` which derives home from `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{Config, PathMapping};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DOCDROP_CONFIG";

/// `<home>/.docdrop/config.yaml`. Pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".docdrop").join("config.yaml")
}

/// Resolve the config path from an explicit argument, the environment, or `home`.
pub fn resolve_path_at(explicit: Option<&Path>, home: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => default_path_at(home),
    }
}

/// `resolve_path_at` convenience wrapper.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(resolve_path_at(None, &home))
}

/// Load a config file.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve then load.
pub fn load(explicit: Option<&Path>) -> Result<(PathBuf, Config), ConfigError> {
    let path = resolve_path(explicit)?;
    let config = load_at(&path)?;
    Ok((path, config))
}

impl Config {
    /// Check the loaded config for problems serde cannot catch.
    ///
    /// Collects every problem rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.tasks.is_empty() {
            problems.push("no tasks configured".to_string());
        }

        for (index, task) in self.tasks.iter().enumerate() {
            let label = task.label(index);
            if task.auth.client_id.trim().is_empty() {
                problems.push(format!("{label}: auth.client_id is empty"));
            }
            if task.auth.data_center.trim().is_empty() && task.auth.endpoints.is_none() {
                problems.push(format!(
                    "{label}: auth.data_center is empty and no endpoints are given"
                ));
            }
            if task.paths.is_empty() {
                problems.push(format!("{label}: no paths configured"));
            }
            for (path_index, mapping) in task.paths.iter().enumerate() {
                let prefix = format!("{label}, path #{}", path_index + 1);
                mapping_problems(&prefix, mapping, &mut problems);
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }
}

fn mapping_problems(prefix: &str, mapping: &PathMapping, problems: &mut Vec<String>) {
    if mapping.remote.0.trim().is_empty() {
        problems.push(format!("{prefix}: remote is empty"));
    }
    if mapping.local.as_os_str().is_empty() {
        problems.push(format!("{prefix}: local is empty"));
    }

    let specs = [
        ("trigger", &mapping.trigger),
        ("filter.in", &mapping.filter.include),
        ("filter.out", &mapping.filter.exclude),
    ];
    for (field, spec) in specs {
        match spec.patterns(field) {
            Ok(patterns) => {
                if field == "trigger" && patterns.is_empty() {
                    problems.push(format!("{prefix}: trigger has no patterns"));
                }
            }
            Err(err) => problems.push(format!("{prefix}: {err}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
