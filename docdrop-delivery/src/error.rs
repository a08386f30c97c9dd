//! Error types for docdrop-delivery.

use std::path::PathBuf;

use thiserror::Error;

use docdrop_core::ConfigError;
use docdrop_remote::RemoteError;

/// All errors that can arise while delivering a task.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The remote repository could not be reached or refused the credentials.
    #[error("connection failed: {0}")]
    Connection(#[source] RemoteError),

    /// A trigger or filter entry in the mapping is malformed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A directory that patterns are matched against could not be listed.
    #[error("cannot list {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// The mapping's remote folder could not be resolved.
    #[error("cannot resolve remote folder {remote}: {source}")]
    FolderLookup {
        remote: String,
        #[source]
        source: RemoteError,
    },

    /// A single file failed to upload.
    #[error("upload of {path} failed: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: RemoteError,
    },

    /// Local read or delete failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`DeliveryError::Filesystem`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeliveryError {
    DeliveryError::Filesystem {
        path: path.into(),
        source,
    }
}
