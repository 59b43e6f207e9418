//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → hosts.rs (reject unknown Host headers)
//!     → transport.rs (redirect to HTTPS when required)
//!     → application / static files
//! Outgoing response:
//!     → transport.rs (HSTS, Secure cookies)
//!     → headers.rs (nosniff, referrer policy, frame options)
//! ```
//!
//! # Design Decisions
//! - Every layer is driven by the resolved SecurityPolicy, never by env vars
//! - Fail closed: a missing or unknown Host is rejected

pub mod headers;
pub mod hosts;
pub mod transport;

pub use hosts::{host_validation_middleware, HostAllowList};
pub use transport::transport_security_middleware;
