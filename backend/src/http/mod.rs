//! REST API served by axum.
//!
//! Requests flow through the layers below; handlers stay thin and call into
//! [`crate::db::services`] with the repository held in [`AppState`].
//!
//! ```text
//! router.rs    CORS, trace, gzip, Cache-Control: no-store, body limit
//!    │
//! session.rs   AdminSession extractor (401 before any body parsing)
//!    │
//! handlers.rs  query/body parsing, JSON envelopes (dto.rs, error.rs)
//!    │
//! db::services reconcile-on-read, validation, ephemeral fallback
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;

pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
