//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → trace / request-id / timeout / body-limit layers
//!     → security layers (host allow-list, HTTPS redirect, HSTS)
//!     → static files (nested at the static base URL)
//!     → application routes (/healthz)
//! ```

pub mod server;

pub use server::{AppServer, AppState};
