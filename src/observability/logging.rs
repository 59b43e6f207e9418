//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DeploymentPosture;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "site_settings=info,settings_cli=info,tower_http=info";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event, for log aggregation.
    Json,
}

impl LogFormat {
    pub fn for_posture(posture: DeploymentPosture) -> Self {
        match posture {
            DeploymentPosture::Production => Self::Json,
            DeploymentPosture::Development => Self::Pretty,
        }
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_posture() {
        assert_eq!(LogFormat::for_posture(DeploymentPosture::Production), LogFormat::Json);
        assert_eq!(LogFormat::for_posture(DeploymentPosture::Development), LogFormat::Pretty);
    }
}
