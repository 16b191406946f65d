//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
///
/// Every variant aborts resolution; a partially resolved configuration is
/// never handed out.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No template exists at the explicit path or any default location
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Template could not be read or decoded
    #[error("Invalid config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// An environment or CLI value failed type coercion
    #[error("Invalid {key} override: {value:?}")]
    InvalidOverride { key: String, value: String },

    /// Required keys absent after all layers were merged
    #[error("Missing required configuration keys: {}", keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    /// An endpoint entry violates its invariants
    #[error("Invalid endpoint #{index}: {reason}")]
    InvalidEndpoint { index: usize, reason: String },

    /// The template exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a parse error for a template path
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Names of the missing keys, if this is a missing-keys error
    pub fn missing_keys(&self) -> Option<&[String]> {
        match self {
            ConfigError::MissingKeys { keys } => Some(keys),
            _ => None,
        }
    }
}
