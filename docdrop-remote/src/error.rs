//! Error types for docdrop-remote.

use thiserror::Error;

/// All errors that can arise while talking to the remote repository.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Login was rejected or the auth endpoint was unreachable.
    #[error("cannot connect to remote repository: {0}")]
    Connection(String),

    /// The requested folder does not exist remotely.
    #[error("remote folder not found: {path}")]
    NotFound { path: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// Network-level failure (DNS, TLS, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body could not be read or decoded.
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The session was used after `close`.
    #[error("session already closed")]
    Closed,
}
