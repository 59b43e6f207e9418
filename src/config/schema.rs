//! Configuration snapshot definitions.
//!
//! This module defines the complete resolved settings structure. All types
//! derive Serde traits so the snapshot can be rendered by the CLI.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::config::framework::FrameworkSettings;

/// One year, in seconds.
pub const HSTS_ONE_YEAR_SECS: u64 = 31_536_000;

/// Two weeks, in seconds.
pub const TWO_WEEKS_SECS: u64 = 1_209_600;

/// Immutable settings derived once from the runtime environment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    /// Application root directory every relative path is anchored to.
    pub base_dir: PathBuf,

    pub debug_enabled: bool,

    /// Permitted request hostnames, in declaration order.
    pub allowed_hosts: Vec<String>,

    /// Value resolved from `DATABASE_URL` (or its fallback).
    pub database_target: String,

    /// The database wiring that is actually in effect.
    pub database: DatabaseSettings,

    pub secret_key: SecretKey,

    /// Transport security settings.
    pub security: SecurityPolicy,

    /// Session persistence settings.
    pub session: SessionPolicy,

    pub static_assets: StaticAssetPolicy,

    pub cache: CachePolicy,

    /// Declarative framework wiring (apps, middleware, templates).
    pub framework: FrameworkSettings,
}

impl ConfigurationSnapshot {
    pub fn posture(&self) -> DeploymentPosture {
        DeploymentPosture::from_debug(self.debug_enabled)
    }
}

/// The two mutually exclusive policy branches.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentPosture {
    Production,
    Development,
}

impl DeploymentPosture {
    pub fn from_debug(debug_enabled: bool) -> Self {
        if debug_enabled {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl fmt::Display for DeploymentPosture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

/// Transport security settings.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SecurityPolicy {
    /// Redirect plain HTTP requests to HTTPS.
    pub force_https: bool,

    /// Mark session and CSRF cookies `Secure`.
    pub secure_cookies: bool,

    /// `max-age` of the Strict-Transport-Security header; 0 disables it.
    pub hsts_seconds: u64,

    pub hsts_include_subdomains: bool,

    pub hsts_preload: bool,
}

impl SecurityPolicy {
    /// Hardened settings used when debug is off.
    pub fn hardened() -> Self {
        Self {
            force_https: true,
            secure_cookies: true,
            hsts_seconds: HSTS_ONE_YEAR_SECS,
            hsts_include_subdomains: true,
            hsts_preload: true,
        }
    }

    /// Plain-HTTP settings used for local development.
    pub fn relaxed() -> Self {
        Self {
            force_https: false,
            secure_cookies: false,
            hsts_seconds: 0,
            hsts_include_subdomains: false,
            hsts_preload: false,
        }
    }

    /// Value for the `Strict-Transport-Security` header, if HSTS is on.
    pub fn hsts_header_value(&self) -> Option<String> {
        if self.hsts_seconds == 0 {
            return None;
        }
        let mut value = format!("max-age={}", self.hsts_seconds);
        if self.hsts_include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.hsts_preload {
            value.push_str("; preload");
        }
        Some(value)
    }
}

/// Where session data is stored.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionEngine {
    /// Sessions persisted as rows in the application database.
    Database,
}

/// Session persistence settings.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SessionPolicy {
    pub engine: SessionEngine,

    /// Cookie lifetime in seconds.
    pub max_age_seconds: u64,

    /// Persist the session (and refresh its expiry) on every request.
    pub save_every_request: bool,

    pub expire_at_browser_close: bool,
}

impl SessionPolicy {
    /// Framework defaults, in effect when debug is off.
    pub fn framework_default() -> Self {
        Self {
            engine: SessionEngine::Database,
            max_age_seconds: TWO_WEEKS_SECS,
            save_every_request: false,
            expire_at_browser_close: false,
        }
    }

    /// Long-lived sessions refreshed on each request, for development.
    pub fn persistent() -> Self {
        Self {
            engine: SessionEngine::Database,
            max_age_seconds: TWO_WEEKS_SECS,
            save_every_request: true,
            expire_at_browser_close: false,
        }
    }
}

/// Storage backend used for collected static files.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaticStorage {
    /// Files are served with gzip/brotli variants when available.
    CompressedStaticFiles,
}

/// Static asset serving settings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaticAssetPolicy {
    /// Public URL prefix, without a leading slash (e.g. `application/static/`).
    pub base_url: String,

    /// Directory assets are collected into and served from.
    pub root_path: PathBuf,

    /// Directories assets are collected from.
    pub source_dirs: Vec<PathBuf>,

    pub storage: StaticStorage,

    pub compression_enabled: bool,
}

impl StaticAssetPolicy {
    /// Router mount point, e.g. `/application/static`.
    pub fn mount_path(&self) -> String {
        let trimmed = self.base_url.trim_matches('/');
        format!("/{}", trimmed)
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Per-process in-memory cache. Not shared between instances.
    LocalMemory,
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CachePolicy {
    pub backend: CacheBackend,

    /// Namespace label separating independent caches in one process.
    pub location: String,

    /// Entry lifetime when `set` is called without an explicit timeout.
    pub default_timeout_secs: u64,

    /// Entry count above which the cache culls.
    pub max_entries: usize,

    /// One in every `cull_frequency` entries is dropped when culling.
    pub cull_frequency: usize,
}

/// Active database wiring.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum DatabaseSettings {
    /// Local file database; `DATABASE_URL` is resolved but unused.
    Sqlite { path: PathBuf },
    /// Connection described by `DATABASE_URL`.
    Url { url: String },
}

impl DatabaseSettings {
    /// Local file database under the application root.
    pub fn local_file(base_dir: &Path) -> Self {
        Self::Sqlite {
            path: base_dir.join("_core").join("database").join("db.sqlite3"),
        }
    }

    pub fn uses_environment_target(&self) -> bool {
        matches!(self, Self::Url { .. })
    }
}

/// Signing key. Never printed or serialized in clear.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    value: String,
    generated: bool,
}

impl SecretKey {
    pub fn from_env(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            generated: false,
        }
    }

    pub fn generated(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            generated: true,
        }
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    /// True when the key was generated at startup rather than configured.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("value", &"[redacted]")
            .field("generated", &self.generated)
            .finish()
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.generated {
            serializer.serialize_str("[generated]")
        } else {
            serializer.serialize_str("[redacted]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_header_value() {
        assert_eq!(
            SecurityPolicy::hardened().hsts_header_value().as_deref(),
            Some("max-age=31536000; includeSubDomains; preload")
        );
        assert_eq!(SecurityPolicy::relaxed().hsts_header_value(), None);

        let partial = SecurityPolicy {
            hsts_seconds: 60,
            hsts_include_subdomains: false,
            hsts_preload: false,
            ..SecurityPolicy::hardened()
        };
        assert_eq!(partial.hsts_header_value().as_deref(), Some("max-age=60"));
    }

    #[test]
    fn test_secret_key_is_redacted() {
        let key = SecretKey::from_env("super-secret-value");
        assert!(!format!("{:?}", key).contains("super-secret-value"));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"[redacted]\"");
        assert_eq!(key.expose(), "super-secret-value");
    }

    #[test]
    fn test_mount_path_normalizes_slashes() {
        let policy = StaticAssetPolicy {
            base_url: "application/static/".into(),
            root_path: PathBuf::from("/srv/static"),
            source_dirs: Vec::new(),
            storage: StaticStorage::CompressedStaticFiles,
            compression_enabled: true,
        };
        assert_eq!(policy.mount_path(), "/application/static");
    }
}
