//! Configuration error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors raised while resolving configuration at startup.
///
/// Every variant is fatal: the application never starts with a partially
/// resolved snapshot.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required configuration: {key} is not set")]
    MissingConfiguration { key: String },

    /// A present value could not be used and no safe default exists.
    #[error("invalid value for {key} ({value:?}): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Semantic checks failed on the resolved snapshot.
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// An environment file is missing, unreadable, or malformed.
    #[error("failed to read environment file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl ConfigError {
    /// The environment variable this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingConfiguration { key } | ConfigError::InvalidValue { key, .. } => {
                Some(key.as_str())
            }
            _ => None,
        }
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
