//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Consumers:
//!     → stdout (pretty in development, JSON in production)
//! ```
//!
//! # Design Decisions
//! - Log format follows the deployment posture
//! - `RUST_LOG` overrides the default filter

pub mod logging;

pub use logging::{init_logging, LogFormat};
