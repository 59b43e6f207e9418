//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of a resolved snapshot
//! - Reject host patterns that could never match a request
//! - Reject weak signing keys in the production posture
//! - Detect static roots that overlap their own source directories
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConfigurationSnapshot → Result<(), Vec<ValidationError>>
//! - Runs before the snapshot is handed to the rest of the application

use std::collections::HashSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::{ConfigurationSnapshot, DeploymentPosture};

/// Minimum length for a configured signing key outside development.
pub const MIN_SECRET_KEY_LEN: usize = 50;

/// Minimum number of distinct characters in a configured signing key.
pub const MIN_SECRET_KEY_UNIQUE_CHARS: usize = 5;

/// A single semantic problem with the resolved settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("allowed host {0:?} is not a valid hostname pattern")]
    InvalidHost(String),

    #[error(
        "SECRET_KEY is too weak for production (needs {}+ characters, {}+ distinct)",
        MIN_SECRET_KEY_LEN,
        MIN_SECRET_KEY_UNIQUE_CHARS
    )]
    WeakSecretKey,

    #[error("static root {} is also listed as a static source directory", .0.display())]
    StaticRootIsSource(PathBuf),
}

/// Run every semantic check, collecting all failures.
pub fn validate_snapshot(snapshot: &ConfigurationSnapshot) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for host in &snapshot.allowed_hosts {
        if !is_valid_host_pattern(host) {
            errors.push(ValidationError::InvalidHost(host.clone()));
        }
    }

    if snapshot.posture() == DeploymentPosture::Production
        && !snapshot.secret_key.is_generated()
        && !is_strong_secret(snapshot.secret_key.expose())
    {
        errors.push(ValidationError::WeakSecretKey);
    }

    let root = &snapshot.static_assets.root_path;
    if snapshot.static_assets.source_dirs.iter().any(|dir| dir == root) {
        errors.push(ValidationError::StaticRootIsSource(root.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `*`, `.example.com`, plain hostnames, IPv4 and bracketed IPv6.
pub fn is_valid_host_pattern(pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(inner) = pattern.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        return !inner.is_empty() && inner.chars().all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.');
    }
    let name = pattern.strip_prefix('.').unwrap_or(pattern);
    !name.is_empty()
        && name
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

fn is_strong_secret(key: &str) -> bool {
    let unique: HashSet<char> = key.chars().collect();
    key.chars().count() >= MIN_SECRET_KEY_LEN && unique.len() >= MIN_SECRET_KEY_UNIQUE_CHARS
}
