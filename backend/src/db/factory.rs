//! Explicit construction of the storage backend.
//!
//! The binary calls [`RepositoryFactory::from_runtime`] once at startup and
//! passes the result into the HTTP state.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::{LocalRepository, OfflineRepository};
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Which storage backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    Postgres,
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Backend named by `REPOSITORY_TYPE`.
    ///
    /// Without it, a database URL selects Postgres and anything else Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or_else(|e| {
                log::warn!("{}; using local repository", e);
                Self::Local
            });
        }

        let has_url = ["DATABASE_URL", "PG_DATABASE_URL"]
            .iter()
            .any(|name| std::env::var_os(name).is_some());
        if has_url {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Builds the repository a process or test should use.
///
/// # Example
/// ```
/// use jai_metro::db::{RepositoryFactory, RepositoryType};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// let repo = rt.block_on(RepositoryFactory::create(RepositoryType::Local, None)).unwrap();
/// assert!(rt.block_on(repo.health_check()).unwrap());
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of `repo_type`.
    ///
    /// `postgres_config` is required for [`RepositoryType::Postgres`].
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("Postgres repository requires PostgresConfig")
                })?;
                Self::postgres_backend(config).await
            }
        }
    }

    /// Connect to Postgres and run its migrations.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Blocking task failed: {}", e)))??;

        let stats = repo.get_pool_stats();
        log::info!(
            "Postgres repository ready (pool max={}, idle={})",
            stats.max_size,
            stats.idle_connections
        );
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "postgres-repo")]
    async fn postgres_backend(config: &PostgresConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo: Arc<dyn FullRepository> = Self::create_postgres(config).await?;
        Ok(repo)
    }

    #[cfg(not(feature = "postgres-repo"))]
    async fn postgres_backend(_config: &PostgresConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Postgres repository feature not enabled",
        ))
    }

    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Repository that refuses every call, for when no backend could be set up.
    pub fn create_offline(reason: impl Into<String>) -> Arc<dyn FullRepository> {
        Arc::new(OfflineRepository::new(reason))
    }

    /// Select and build a backend from environment variables.
    pub async fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        match RepositoryType::from_env() {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                #[cfg(not(feature = "postgres-repo"))]
                let config = PostgresConfig::default();
                Self::postgres_backend(&config).await
            }
        }
    }

    /// Build the backend described by a `repository.toml` file.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        match config.to_postgres_config()? {
            Some(pg_config) => Self::postgres_backend(&pg_config).await,
            None => Ok(Self::create_local()),
        }
    }

    /// Create the repository the process should use.
    ///
    /// A path in `REPOSITORY_CONFIG`, or a `repository.toml` in one of the
    /// standard locations, takes precedence over plain environment variables.
    pub async fn from_runtime() -> RepositoryResult<Arc<dyn FullRepository>> {
        if let Ok(path) = std::env::var("REPOSITORY_CONFIG") {
            return Self::from_config_file(path).await;
        }
        match RepositoryConfig::find_default_location() {
            Some(path) => {
                log::info!("Using repository config {}", path.display());
                Self::from_config_file(path).await
            }
            None => Self::from_env().await,
        }
    }
}
