//! End-to-end resolution of settings from environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use site_settings::config::schema::{HSTS_ONE_YEAR_SECS, TWO_WEEKS_SECS};
use site_settings::config::{DatabaseSettings, DeploymentPosture, Middleware};
use site_settings::{load_configuration, ConfigError};

mod common;

const BASE: &str = "/srv/site/application";

#[test]
fn test_production_is_the_default_posture() {
    let config = common::snapshot(&[("ALLOWED_HOSTS", "example.com www.example.com")], Path::new(BASE));

    assert!(!config.debug_enabled);
    assert_eq!(config.posture(), DeploymentPosture::Production);
    assert_eq!(config.allowed_hosts, vec!["example.com", "www.example.com"]);

    assert!(config.security.force_https);
    assert!(config.security.secure_cookies);
    assert_eq!(config.security.hsts_seconds, HSTS_ONE_YEAR_SECS);
    assert!(config.security.hsts_include_subdomains);
    assert!(config.security.hsts_preload);
    assert!(!config.session.save_every_request);
}

#[test]
fn test_debug_true_selects_development_branch() {
    let config = common::snapshot(&[("ALLOWED_HOSTS", "localhost"), ("DEBUG", "TRUE")], Path::new(BASE));

    assert!(config.debug_enabled);
    assert_eq!(config.session.max_age_seconds, TWO_WEEKS_SECS);
    assert!(config.session.save_every_request);
    assert!(!config.session.expire_at_browser_close);

    assert!(!config.security.force_https);
    assert!(!config.security.secure_cookies);
    assert_eq!(config.security.hsts_seconds, 0);
}

#[test]
fn test_unrecognized_debug_value_stays_secure() {
    let config = common::snapshot(&[("ALLOWED_HOSTS", "example.com"), ("DEBUG", "1")], Path::new(BASE));
    assert!(!config.debug_enabled);
    assert!(config.security.force_https);
}

#[test]
fn test_missing_allowed_hosts_names_the_key() {
    let err = load_configuration(&common::env(&[("DEBUG", "true")]), Path::new(BASE)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingConfiguration { .. }));
    assert!(err.to_string().contains("ALLOWED_HOSTS"));
}

#[test]
fn test_empty_allowed_hosts_is_fatal() {
    let err = load_configuration(&common::env(&[("ALLOWED_HOSTS", "")]), Path::new(BASE)).unwrap_err();
    assert_eq!(err.key(), Some("ALLOWED_HOSTS"));
}

#[test]
fn test_local_database_is_active_by_default() {
    let config = common::snapshot(
        &[("ALLOWED_HOSTS", "example.com"), ("DATABASE_URL", "postgres://app@db/site")],
        Path::new(BASE),
    );
    assert_eq!(config.database_target, "postgres://app@db/site");
    assert_eq!(
        config.database,
        DatabaseSettings::Sqlite {
            path: PathBuf::from("/srv/site/application/_core/database/db.sqlite3")
        }
    );
}

#[test]
fn test_database_url_backend_uses_environment_target() {
    let config = common::snapshot(
        &[
            ("ALLOWED_HOSTS", "example.com"),
            ("DATABASE_URL", "postgres://app@db/site"),
            ("DATABASE_BACKEND", "url"),
        ],
        Path::new(BASE),
    );
    assert_eq!(
        config.database,
        DatabaseSettings::Url {
            url: "postgres://app@db/site".into()
        }
    );

    let err = load_configuration(
        &common::env(&[("ALLOWED_HOSTS", "example.com"), ("DATABASE_BACKEND", "url")]),
        Path::new(BASE),
    )
    .unwrap_err();
    assert_eq!(err.key(), Some("DATABASE_URL"));
}

#[test]
fn test_static_and_cache_do_not_depend_on_debug() {
    let prod = common::snapshot(&[("ALLOWED_HOSTS", "example.com")], Path::new(BASE));
    let dev = common::snapshot(&[("ALLOWED_HOSTS", "example.com"), ("DEBUG", "true")], Path::new(BASE));

    assert_eq!(prod.static_assets, dev.static_assets);
    assert_eq!(prod.cache, dev.cache);
    assert_eq!(prod.static_assets.root_path, PathBuf::from("/srv/site/static"));
    assert!(prod.static_assets.compression_enabled);
    assert_eq!(prod.cache.location, "DataFlair");
}

#[test]
fn test_framework_settings_are_resolved() {
    let config = common::snapshot(&[("ALLOWED_HOSTS", "example.com")], Path::new(BASE));
    let framework = &config.framework;

    assert_eq!(framework.middleware.len(), 8);
    assert!(framework.has_middleware(Middleware::Security));
    assert_eq!(framework.installed_apps.last().map(String::as_str), Some("application.main"));
    assert_eq!(framework.password_validators.len(), 4);
    assert_eq!(framework.localization.time_zone, "UTC");
}

#[test]
fn test_snapshot_reads_are_stable_across_threads() {
    let config = common::snapshot(&[("ALLOWED_HOSTS", "a b c")], Path::new(BASE));
    let first = (*config).clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = Arc::clone(&config);
            std::thread::spawn(move || (*config).clone())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), first);
    }
    assert_eq!(*config, first);
}

#[test]
fn test_rendered_snapshot_hides_secret() {
    let config = common::snapshot(
        &[
            ("ALLOWED_HOSTS", "example.com"),
            ("SECRET_KEY", "k3y-with-plenty-of-distinct-characters-0123456789abcdef"),
        ],
        Path::new(BASE),
    );

    let json = serde_json::to_string(config.as_ref()).unwrap();
    assert!(!json.contains("k3y-with-plenty"));
    assert!(json.contains("\"secret_key\":\"[redacted]\""));

    let rendered = toml::to_string_pretty(config.as_ref()).unwrap();
    assert!(rendered.contains("allowed_hosts"));
    assert!(!rendered.contains("k3y-with-plenty"));
}
