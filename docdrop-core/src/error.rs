//! Error types for docdrop-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the resolved path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`, so `~/.docdrop/` cannot be located.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,

    /// A trigger or filter entry is neither a string nor a list of strings.
    #[error("invalid {field} pattern(s): expected a string or a list of strings, found {found}")]
    InvalidPatterns { field: &'static str, found: String },

    /// Semantic validation failed; one message per problem.
    #[error("config is invalid:\n  - {}", .problems.join("\n  - "))]
    Invalid { problems: Vec<String> },
}
