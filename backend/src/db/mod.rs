//! Storage for charts, daily records and results.
//!
//! # Layers
//!
//! ```text
//! http handlers
//!      │
//! services.rs      reconcile-on-read, validation, ephemeral fallback
//!      │
//! repository/      ChartRepository + DailyRepository + ResultRepository
//!      │
//!      ├── repositories::local     in-memory, health toggle for outage tests
//!      ├── repositories::postgres  Diesel, feature `postgres-repo`
//!      └── repositories::offline   every call fails with NotConnected
//! ```
//!
//! There is no process-global repository. The binary builds one with
//! [`RepositoryFactory`] and hands it to the HTTP state; tests build their own.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};

/// Placeholder so configuration code compiles without the Postgres backend.
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{ChartView, DailyView};

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::{LocalRepository, OfflineRepository};
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ChartRepository, DailyRepository, ErrorContext, FullRepository, RepositoryError,
    RepositoryResult, ResultRepository,
};
