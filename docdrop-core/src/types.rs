//! Domain types for docdrop configuration.
//!
//! All local path fields use `PathBuf`; remote locations use [`RemotePath`].
//! All types are deserializable via serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A folder path inside the remote document repository, e.g. `/Shared/Inbound`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePath(pub String);

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemotePath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemotePath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// One or more glob patterns as written in the config file.
///
/// A single string is shorthand for a one-element list. Any other YAML value
/// is kept as-is so that the mapping it belongs to fails on its own when the
/// patterns are first needed, instead of rejecting the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    One(String),
    Many(Vec<String>),
    Malformed(serde_yaml::Value),
}

impl Default for PatternSpec {
    fn default() -> Self {
        PatternSpec::Many(Vec::new())
    }
}

impl PatternSpec {
    /// Normalized pattern list.
    ///
    /// `field` names the config key for the error message.
    pub fn patterns(&self, field: &'static str) -> Result<Vec<String>, ConfigError> {
        match self {
            PatternSpec::One(pattern) => Ok(vec![pattern.clone()]),
            PatternSpec::Many(patterns) => Ok(patterns.clone()),
            PatternSpec::Malformed(value) => Err(ConfigError::InvalidPatterns {
                field,
                found: describe_value(value),
            }),
        }
    }
}

impl From<&str> for PatternSpec {
    fn from(s: &str) -> Self {
        PatternSpec::One(s.to_owned())
    }
}

impl From<Vec<&str>> for PatternSpec {
    fn from(v: Vec<&str>) -> Self {
        PatternSpec::Many(v.into_iter().map(str::to_owned).collect())
    }
}

fn describe_value(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(_) => "a boolean".to_string(),
        serde_yaml::Value::Number(_) => "a number".to_string(),
        serde_yaml::Value::String(_) => "a string".to_string(),
        serde_yaml::Value::Sequence(_) => "a list containing non-string entries".to_string(),
        serde_yaml::Value::Mapping(_) => "a mapping".to_string(),
        serde_yaml::Value::Tagged(_) => "a tagged value".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a task does with its remaining path mappings after one of them fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the task at the first failing mapping.
    #[default]
    Abort,
    /// Record the failure and move on to the next mapping.
    Continue,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Explicit endpoint URLs for the remote repository, overriding the ones
/// derived from the data center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_url: String,
    pub upload_url: String,
}

/// Credential bundle handed to the remote repository client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub data_center: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Endpoints>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("data_center", &self.data_center)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Include/exclude glob patterns applied inside a triggered directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "in", default)]
    pub include: PatternSpec,
    #[serde(rename = "out", default)]
    pub exclude: PatternSpec,
}

/// One source directory → remote folder delivery rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMapping {
    pub remote: RemotePath,
    /// Local root that trigger patterns are matched against.
    pub local: PathBuf,
    pub trigger: PatternSpec,
    #[serde(default)]
    pub filter: Filter,
    /// Remove the whole triggered directory after a successful delivery.
    #[serde(default)]
    pub delete: bool,
}

/// One authenticated session over an ordered list of path mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub auth: Credentials,
    #[serde(default)]
    pub on_error: FailurePolicy,
    #[serde(default)]
    pub paths: Vec<PathMapping>,
}

impl Task {
    /// Human-readable label: the configured name, or the position in the file.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("task #{}", index + 1),
        }
    }
}

/// Root of the docdrop YAML config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
