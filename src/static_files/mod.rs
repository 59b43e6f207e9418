//! Static asset collection and serving.
//!
//! # Data Flow
//! ```text
//! <base_dir>/static/**          (source dirs)
//!     → collect.rs (copy into static root)
//!     → <base_dir>/../static/** (static root)
//!     → static_router() (ServeDir under the public base URL)
//! ```
//!
//! # Design Decisions
//! - Pre-compressed `.gz`/`.br` siblings are preferred when present
//! - Otherwise responses are compressed on the fly when the policy allows

pub mod collect;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::config::StaticAssetPolicy;

pub use collect::{collect_static, CollectError, CollectReport};

/// Router serving the static root, to be nested at the policy's mount path.
pub fn static_router(policy: &StaticAssetPolicy) -> Router {
    let serve = ServeDir::new(&policy.root_path)
        .precompressed_gzip()
        .precompressed_br();
    let router = Router::new().fallback_service(serve);
    if policy.compression_enabled {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}
