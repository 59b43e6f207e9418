//! Configuration loading from the runtime environment.

use std::path::{Path, PathBuf};

use crate::config::env::RuntimeEnvironment;
use crate::config::error::ConfigError;
use crate::config::framework::FrameworkSettings;
use crate::config::resolver::{
    derive_cache_policy, derive_policies, derive_static_asset_policy, resolve_allowed_hosts,
    resolve_database, resolve_database_target, resolve_debug_flag, resolve_secret_key,
};
use crate::config::schema::ConfigurationSnapshot;
use crate::config::validation::validate_snapshot;

/// Resolve and validate the full settings snapshot.
///
/// Called once at process entry; the result is shared read-only.
pub fn load_configuration(
    env: &RuntimeEnvironment,
    base_dir: &Path,
) -> Result<ConfigurationSnapshot, ConfigError> {
    let base_dir = absolute_base_dir(base_dir);

    let allowed_hosts = resolve_allowed_hosts(env)?;
    let debug_enabled = resolve_debug_flag(env);
    let database_target = resolve_database_target(env);
    let database = resolve_database(env, &base_dir, &database_target)?;
    let policies = derive_policies(debug_enabled);

    let snapshot = ConfigurationSnapshot {
        debug_enabled,
        allowed_hosts,
        database_target,
        database,
        secret_key: resolve_secret_key(env),
        security: policies.security,
        session: policies.session,
        static_assets: derive_static_asset_policy(&base_dir),
        cache: derive_cache_policy(),
        framework: FrameworkSettings::for_base_dir(&base_dir),
        base_dir,
    };

    validate_snapshot(&snapshot).map_err(ConfigError::Validation)?;

    Ok(snapshot)
}

/// Log the resolved settings and their known caveats.
pub fn log_snapshot(snapshot: &ConfigurationSnapshot) {
    tracing::info!(
        posture = %snapshot.posture(),
        allowed_hosts = ?snapshot.allowed_hosts,
        force_https = snapshot.security.force_https,
        hsts_seconds = snapshot.security.hsts_seconds,
        session_max_age = snapshot.session.max_age_seconds,
        static_root = %snapshot.static_assets.root_path.display(),
        "Configuration loaded"
    );

    if snapshot.database.uses_environment_target() {
        tracing::info!("Database connection taken from DATABASE_URL");
    } else {
        tracing::info!(
            database_target = %snapshot.database_target,
            "Using the local file database; DATABASE_URL is resolved but inactive"
        );
    }

    if snapshot.secret_key.is_generated() {
        tracing::warn!("SECRET_KEY not set; generated a per-process key, sessions will not survive a restart");
    }

    if snapshot.allowed_hosts.iter().any(|h| h == "*") {
        tracing::warn!("ALLOWED_HOSTS contains '*', host header validation is disabled");
    }

    tracing::warn!(
        location = %snapshot.cache.location,
        "Cache is process-local; multiple instances will not share cached entries"
    );
}

fn absolute_base_dir(base_dir: &Path) -> PathBuf {
    std::path::absolute(base_dir).unwrap_or_else(|_| base_dir.to_path_buf())
}
