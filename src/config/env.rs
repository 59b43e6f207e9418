//! Runtime environment snapshot.
//!
//! The process environment is captured once at startup into an immutable
//! map. Everything downstream reads from the snapshot, never from
//! `std::env` directly, so tests can build environments from plain pairs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;

/// Env var: space-separated list of permitted request hostnames.
pub const ENV_ALLOWED_HOSTS: &str = "ALLOWED_HOSTS";
/// Env var: selects the development policy branch when `true`.
pub const ENV_DEBUG: &str = "DEBUG";
/// Env var: database connection target.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Env var: which database option is active (`sqlite` or `url`).
pub const ENV_DATABASE_BACKEND: &str = "DATABASE_BACKEND";
/// Env var: signing key for sessions and CSRF tokens.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";

/// Read-only mapping of environment variables captured at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    vars: BTreeMap<String, String>,
}

impl RuntimeEnvironment {
    /// Capture the current process environment.
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Load a `.env` file into the process environment, then capture it.
    ///
    /// With `path == None` the `.env` in the working directory is used if
    /// present. An explicitly named file must exist. A file that exists but
    /// cannot be parsed is always an error. Variables already set in the
    /// process take precedence over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_env_file(path)?,
            None => {
                let cwd = std::env::current_dir().map_err(|e| ConfigError::EnvFile {
                    path: PathBuf::from(DEFAULT_ENV_FILE),
                    source: dotenvy::Error::Io(e),
                })?;
                load_default_env_file(&cwd)?;
            }
        }
        Ok(Self::from_process())
    }

    /// Build an environment from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Look up a variable, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Look up a variable that must be present.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingConfiguration {
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Name of the environment file looked up when none is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Load `<dir>/.env` if it exists. Returns whether a file was loaded.
fn load_default_env_file(dir: &Path) -> Result<bool, ConfigError> {
    let path = dir.join(DEFAULT_ENV_FILE);
    if !path.exists() {
        return Ok(false);
    }
    load_env_file(&path)?;
    Ok(true)
}

fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded environment file");
    Ok(())
}
