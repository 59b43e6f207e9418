//! Individual resolution steps from environment to settings.
//!
//! Each function covers one concern and is pure apart from logging, so
//! the loader can compose them and tests can exercise them one by one.

use std::path::Path;

use rand::seq::SliceRandom;
use url::Url;

use crate::config::env::{
    RuntimeEnvironment, ENV_ALLOWED_HOSTS, ENV_DATABASE_BACKEND, ENV_DATABASE_URL, ENV_DEBUG,
    ENV_SECRET_KEY,
};
use crate::config::error::ConfigError;
use crate::config::schema::{
    CacheBackend, CachePolicy, DatabaseSettings, DeploymentPosture, SecretKey, SecurityPolicy,
    SessionPolicy, StaticAssetPolicy, StaticStorage,
};

/// Fallback used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_TARGET: &str = "default_db_url";

/// Public URL prefix for static assets.
pub const STATIC_BASE_URL: &str = "application/static/";

/// Namespace label of the default cache.
pub const CACHE_LOCATION: &str = "DataFlair";

const SECRET_KEY_LEN: usize = 50;
const SECRET_KEY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

/// Security and session settings selected by the debug flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySet {
    pub posture: DeploymentPosture,
    pub security: SecurityPolicy,
    pub session: SessionPolicy,
}

/// Parse `ALLOWED_HOSTS` into an ordered list of hostnames.
///
/// The variable is required and must name at least one host.
pub fn resolve_allowed_hosts(env: &RuntimeEnvironment) -> Result<Vec<String>, ConfigError> {
    let raw = env.require(ENV_ALLOWED_HOSTS)?;
    let hosts: Vec<String> = raw.split_whitespace().map(String::from).collect();
    if hosts.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: ENV_ALLOWED_HOSTS.to_string(),
            value: raw.to_string(),
            reason: "at least one hostname is required".to_string(),
        });
    }
    Ok(hosts)
}

/// Resolve `DEBUG`. Anything other than a case variant of `true` is false.
pub fn resolve_debug_flag(env: &RuntimeEnvironment) -> bool {
    let raw = env.get_or(ENV_DEBUG, "False");
    let lowered = raw.to_ascii_lowercase();
    match lowered.as_str() {
        "true" => true,
        "false" => false,
        _ => {
            tracing::warn!(value = %raw, "Unrecognized DEBUG value, treating as false");
            false
        }
    }
}

/// Resolve `DATABASE_URL`, falling back to [`DEFAULT_DATABASE_TARGET`].
pub fn resolve_database_target(env: &RuntimeEnvironment) -> String {
    env.get_or(ENV_DATABASE_URL, DEFAULT_DATABASE_TARGET).to_string()
}

/// Pick the active database wiring.
///
/// `DATABASE_BACKEND=url` makes the resolved target live and requires it
/// to parse as a URL. Anything else keeps the local file database.
pub fn resolve_database(
    env: &RuntimeEnvironment,
    base_dir: &Path,
    target: &str,
) -> Result<DatabaseSettings, ConfigError> {
    let backend = env.get_or(ENV_DATABASE_BACKEND, "sqlite").to_ascii_lowercase();
    match backend.as_str() {
        "url" => {
            let url = Url::parse(target).map_err(|e| ConfigError::InvalidValue {
                key: ENV_DATABASE_URL.to_string(),
                value: target.to_string(),
                reason: e.to_string(),
            })?;
            Ok(DatabaseSettings::Url {
                url: url.to_string(),
            })
        }
        "sqlite" => Ok(DatabaseSettings::local_file(base_dir)),
        other => {
            tracing::warn!(value = %other, "Unrecognized DATABASE_BACKEND, using the local file database");
            Ok(DatabaseSettings::local_file(base_dir))
        }
    }
}

/// Select security and session settings for the given debug flag.
pub fn derive_policies(debug_enabled: bool) -> PolicySet {
    match DeploymentPosture::from_debug(debug_enabled) {
        DeploymentPosture::Production => PolicySet {
            posture: DeploymentPosture::Production,
            security: SecurityPolicy::hardened(),
            session: SessionPolicy::framework_default(),
        },
        DeploymentPosture::Development => PolicySet {
            posture: DeploymentPosture::Development,
            security: SecurityPolicy::relaxed(),
            session: SessionPolicy::persistent(),
        },
    }
}

/// Static asset locations relative to the application root.
pub fn derive_static_asset_policy(base_dir: &Path) -> StaticAssetPolicy {
    let parent = base_dir.parent().unwrap_or(base_dir);
    StaticAssetPolicy {
        base_url: STATIC_BASE_URL.to_string(),
        root_path: parent.join("static"),
        source_dirs: vec![base_dir.join("static")],
        storage: StaticStorage::CompressedStaticFiles,
        compression_enabled: true,
    }
}

/// The cache backend. Constant regardless of environment.
pub fn derive_cache_policy() -> CachePolicy {
    CachePolicy {
        backend: CacheBackend::LocalMemory,
        location: CACHE_LOCATION.to_string(),
        default_timeout_secs: 300,
        max_entries: 300,
        cull_frequency: 3,
    }
}

/// Use `SECRET_KEY` when set, otherwise generate a key for this process.
pub fn resolve_secret_key(env: &RuntimeEnvironment) -> SecretKey {
    match env.get(ENV_SECRET_KEY) {
        Some(value) if !value.trim().is_empty() => SecretKey::from_env(value),
        _ => SecretKey::generated(generate_secret_key()),
    }
}

fn generate_secret_key() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_KEY_LEN)
        .filter_map(|_| SECRET_KEY_CHARS.choose(&mut rng).map(|&b| b as char))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{SessionEngine, HSTS_ONE_YEAR_SECS, TWO_WEEKS_SECS};
    use std::path::PathBuf;

    fn env(pairs: &[(&str, &str)]) -> RuntimeEnvironment {
        RuntimeEnvironment::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_debug_defaults_to_false() {
        assert!(!resolve_debug_flag(&env(&[])));
        for value in ["false", "False", "FALSE", "fAlSe"] {
            assert!(!resolve_debug_flag(&env(&[("DEBUG", value)])), "{}", value);
        }
    }

    #[test]
    fn test_debug_true_variants() {
        for value in ["true", "True", "TRUE", "tRuE"] {
            assert!(resolve_debug_flag(&env(&[("DEBUG", value)])), "{}", value);
        }
    }

    #[test]
    fn test_debug_other_values_are_false() {
        for value in ["1", "yes", "on", "", " true", "truthy"] {
            assert!(!resolve_debug_flag(&env(&[("DEBUG", value)])), "{:?}", value);
        }
    }

    #[test]
    fn test_allowed_hosts_split_in_order() {
        let hosts = resolve_allowed_hosts(&env(&[("ALLOWED_HOSTS", "a b c")])).unwrap();
        assert_eq!(hosts, vec!["a", "b", "c"]);

        let hosts = resolve_allowed_hosts(&env(&[("ALLOWED_HOSTS", "  example.com\t.example.org  ")])).unwrap();
        assert_eq!(hosts, vec!["example.com", ".example.org"]);
    }

    #[test]
    fn test_allowed_hosts_missing() {
        let err = resolve_allowed_hosts(&env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfiguration { ref key } if key == "ALLOWED_HOSTS"));
    }

    #[test]
    fn test_allowed_hosts_blank_is_fatal() {
        let err = resolve_allowed_hosts(&env(&[("ALLOWED_HOSTS", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(err.key(), Some("ALLOWED_HOSTS"));
    }

    #[test]
    fn test_production_policies() {
        let set = derive_policies(false);
        assert_eq!(set.posture, DeploymentPosture::Production);
        assert!(set.security.force_https);
        assert!(set.security.secure_cookies);
        assert_eq!(set.security.hsts_seconds, HSTS_ONE_YEAR_SECS);
        assert!(set.security.hsts_include_subdomains);
        assert!(set.security.hsts_preload);
        assert!(!set.session.save_every_request);
    }

    #[test]
    fn test_development_policies() {
        let set = derive_policies(true);
        assert_eq!(set.posture, DeploymentPosture::Development);
        assert_eq!(set.session.engine, SessionEngine::Database);
        assert_eq!(set.session.max_age_seconds, TWO_WEEKS_SECS);
        assert!(set.session.save_every_request);
        assert!(!set.session.expire_at_browser_close);
        assert!(!set.security.force_https);
        assert_eq!(set.security.hsts_seconds, 0);
    }

    #[test]
    fn test_branches_share_no_policy_values() {
        let prod = derive_policies(false);
        let dev = derive_policies(true);
        assert_ne!(prod.security, dev.security);
        assert_ne!(prod.session, dev.session);
    }

    #[test]
    fn test_database_target_fallback() {
        assert_eq!(resolve_database_target(&env(&[])), DEFAULT_DATABASE_TARGET);
        assert_eq!(
            resolve_database_target(&env(&[("DATABASE_URL", "postgres://u@db/app")])),
            "postgres://u@db/app"
        );
    }

    #[test]
    fn test_database_defaults_to_local_file() {
        let base = PathBuf::from("/srv/site/application");
        let db = resolve_database(&env(&[]), &base, "postgres://u@db/app").unwrap();
        assert_eq!(
            db,
            DatabaseSettings::Sqlite {
                path: PathBuf::from("/srv/site/application/_core/database/db.sqlite3")
            }
        );
        assert!(!db.uses_environment_target());
    }

    #[test]
    fn test_database_url_backend_requires_parseable_target() {
        let base = PathBuf::from("/srv/app");
        let live = resolve_database(&env(&[("DATABASE_BACKEND", "url")]), &base, "postgres://u@db/app").unwrap();
        assert!(live.uses_environment_target());

        let err = resolve_database(&env(&[("DATABASE_BACKEND", "URL")]), &base, DEFAULT_DATABASE_TARGET).unwrap_err();
        assert_eq!(err.key(), Some("DATABASE_URL"));
    }

    #[test]
    fn test_static_asset_layout() {
        let policy = derive_static_asset_policy(Path::new("/srv/site/application"));
        assert_eq!(policy.base_url, "application/static/");
        assert_eq!(policy.root_path, PathBuf::from("/srv/site/static"));
        assert_eq!(policy.source_dirs, vec![PathBuf::from("/srv/site/application/static")]);
        assert!(policy.compression_enabled);
    }

    #[test]
    fn test_cache_policy_is_constant() {
        assert_eq!(derive_cache_policy(), derive_cache_policy());
        assert_eq!(derive_cache_policy().location, "DataFlair");
        assert_eq!(derive_cache_policy().backend, CacheBackend::LocalMemory);
    }

    #[test]
    fn test_secret_key_generation() {
        let generated = resolve_secret_key(&env(&[]));
        assert!(generated.is_generated());
        assert_eq!(generated.len(), SECRET_KEY_LEN);

        let blank = resolve_secret_key(&env(&[("SECRET_KEY", "  ")]));
        assert!(blank.is_generated());

        let configured = resolve_secret_key(&env(&[("SECRET_KEY", "from-env")]));
        assert!(!configured.is_generated());
        assert_eq!(configured.expose(), "from-env");

        let padded = resolve_secret_key(&env(&[("SECRET_KEY", " padded-key\t")]));
        assert_eq!(padded.expose(), " padded-key\t");
    }
}
