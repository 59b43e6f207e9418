//! Startup orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::resolver::resolve_debug_flag;
use crate::config::{
    load_configuration, log_snapshot, ConfigError, ConfigurationSnapshot, DeploymentPosture,
    RuntimeEnvironment,
};
use crate::observability::{init_logging, LogFormat};

/// Inputs needed before the environment is read.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    /// Application root directory.
    pub base_dir: PathBuf,
    /// Explicit `.env` file; `None` tries `./.env` and ignores its absence.
    /// A present file that fails to parse aborts startup either way.
    pub env_file: Option<PathBuf>,
}

/// Capture the environment, install logging, and resolve the snapshot.
///
/// Logging format is chosen from `DEBUG` before the full resolution so
/// that resolution errors are reported in the right format.
pub fn initialize(options: &StartupOptions) -> Result<Arc<ConfigurationSnapshot>, ConfigError> {
    let env = RuntimeEnvironment::load(options.env_file.as_deref())?;

    let posture = DeploymentPosture::from_debug(resolve_debug_flag(&env));
    init_logging(LogFormat::for_posture(posture));

    let snapshot = load_configuration(&env, &options.base_dir).inspect_err(|e| {
        tracing::error!(error = %e, "Configuration rejected, aborting startup");
    })?;
    log_snapshot(&snapshot);

    Ok(Arc::new(snapshot))
}
