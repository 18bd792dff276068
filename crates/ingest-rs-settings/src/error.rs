//! Error types for settings resolution and typed access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while reading layers, normalizing keys, or coercing values.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be parsed as YAML.
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// An explicitly requested settings file does not exist.
    #[error("settings file not found: {0}")]
    FileNotFound(PathBuf),
    /// Reading the settings file failed for a reason other than absence.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A file leaf has a shape the resolver does not accept.
    #[error("invalid value at {path}: {message}")]
    InvalidValue { path: String, message: String },
    /// A raw key could not be turned into a canonical key.
    #[error("invalid setting key {raw:?}: {message}")]
    InvalidKey { raw: String, message: String },
    /// An environment variable name maps to zero or several registered keys.
    #[error("cannot resolve environment variable {var} to a single setting (candidates: {candidates:?})")]
    AmbiguousKey {
        var: String,
        candidates: Vec<String>,
    },
    /// A value exists but cannot be coerced into the requested type.
    #[error("setting {key} expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
}
