//! Shared fixtures for integration tests.

use std::path::Path;
use std::sync::Arc;

use site_settings::{load_configuration, ConfigurationSnapshot, RuntimeEnvironment};

/// Build an environment from literal pairs.
pub fn env(pairs: &[(&str, &str)]) -> RuntimeEnvironment {
    RuntimeEnvironment::from_pairs(pairs.iter().copied())
}

/// Resolve a snapshot that is expected to be valid.
pub fn snapshot(pairs: &[(&str, &str)], base_dir: &Path) -> Arc<ConfigurationSnapshot> {
    Arc::new(load_configuration(&env(pairs), base_dir).expect("configuration should resolve"))
}
