//! Repository implementations module.
//!
//! - `local`: In-memory implementation for unit testing and local development
//! - `offline`: Placeholder used when the configured backend is unreachable at startup
//! - `postgres`: PostgreSQL implementation with Diesel ORM
pub mod local;
pub mod offline;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
pub use offline::OfflineRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
