//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (+ optional .env file)
//!     → env.rs (RuntimeEnvironment, captured once)
//!     → resolver.rs (one function per concern)
//!     → loader.rs (compose & validate)
//!     → ConfigurationSnapshot (validated, immutable)
//!     → shared via Arc to the server and cache
//! ```
//!
//! # Design Decisions
//! - The snapshot is built once at startup and never mutated
//! - Missing required variables abort startup with the key name
//! - Unrecognized optional values fall back to the safe default
//! - Validation reports every problem, not just the first

pub mod env;
pub mod error;
pub mod framework;
pub mod loader;
pub mod resolver;
pub mod schema;
pub mod validation;

pub use env::RuntimeEnvironment;
pub use error::ConfigError;
pub use framework::{FrameworkSettings, Middleware};
pub use loader::{load_configuration, log_snapshot};
pub use schema::{
    CachePolicy, ConfigurationSnapshot, DatabaseSettings, DeploymentPosture, SecurityPolicy,
    SessionPolicy, StaticAssetPolicy,
};
