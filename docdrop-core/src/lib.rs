//! docdrop core library — domain types, config loading, errors.
//!
//! - [`types`] — path mappings, tasks, credentials, pattern specs
//! - [`error`] — [`ConfigError`]
//! - [`config`] — locate / load / validate

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    Config, Credentials, Endpoints, FailurePolicy, Filter, PathMapping, PatternSpec, RemotePath,
    Task,
};
