//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router from the resolved snapshot
//! - Wire up middleware in the configured order
//! - Serve collected static files
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::{LocalMemoryCache, Timeout};
use crate::config::{ConfigurationSnapshot, DeploymentPosture, Middleware};
use crate::lifecycle::shutdown;
use crate::security::{self, headers, HostAllowList};
use crate::static_files::static_router;

/// Request timeout applied to every route.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 2_621_440;

const STARTED_AT_KEY: &str = "server:started_at";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigurationSnapshot>,
    pub cache: LocalMemoryCache,
}

/// HTTP server for the application.
pub struct AppServer {
    router: Router,
    config: Arc<ConfigurationSnapshot>,
}

impl AppServer {
    /// Create a new server from a resolved snapshot.
    pub fn new(config: Arc<ConfigurationSnapshot>) -> Self {
        let cache = LocalMemoryCache::from_policy(&config.cache);
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if let Err(e) = cache.set(STARTED_AT_KEY, &started_at, Timeout::Never) {
            tracing::warn!(error = %e, "Failed to record start time");
        }

        let state = AppState {
            config: config.clone(),
            cache,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ConfigurationSnapshot, state: AppState) -> Router {
        let framework = &config.framework;
        for mw in framework.middleware.iter().filter(|mw| !mw.is_provided()) {
            tracing::debug!(middleware = ?mw, "Middleware left to the hosting framework");
        }

        let mut app = Router::new()
            .route("/healthz", get(health_handler))
            .with_state(state);

        if framework.has_middleware(Middleware::StaticFiles) {
            app = app.nest_service(
                &config.static_assets.mount_path(),
                static_router(&config.static_assets),
            );
        }

        // Router::layer only wraps routes added before it.
        if framework.has_middleware(Middleware::Clickjacking) {
            app = app.layer(headers::frame_options_layer());
        }

        if framework.has_middleware(Middleware::Security) {
            app = app
                .layer(headers::referrer_policy_layer())
                .layer(headers::content_type_options_layer())
                .layer(middleware::from_fn_with_state(
                    config.security,
                    security::transport_security_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    HostAllowList::new(&config.allowed_hosts),
                    security::host_validation_middleware,
                ));
        }

        app.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            posture = %self.config.posture(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ConfigurationSnapshot {
        &self.config
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub posture: DeploymentPosture,
    pub uptime_secs: Option<u64>,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let uptime_secs = match state.cache.get::<u64>(STARTED_AT_KEY) {
        Ok(started) => started.map(|s| now.saturating_sub(s)),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable start time in cache");
            None
        }
    };

    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        posture: state.config.posture(),
        uptime_secs,
    })
}
