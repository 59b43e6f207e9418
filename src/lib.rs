//! Environment-driven settings for a web application.
//!
//! The process environment is resolved once at startup into an immutable
//! [`ConfigurationSnapshot`], which is then passed explicitly to the
//! server, cache and static file handling.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod static_files;

pub use config::{load_configuration, ConfigError, ConfigurationSnapshot, RuntimeEnvironment};
pub use http::AppServer;
pub use lifecycle::Shutdown;
