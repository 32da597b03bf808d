//! Chart document storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ChartDocument, ChartKey, StoredChart};

/// Repository trait for yearly chart documents.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across handlers.
#[async_trait]
pub trait ChartRepository: Send + Sync {
    /// Check if the storage connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch the stored chart for `key`.
    ///
    /// # Returns
    /// * `Ok(Some(StoredChart))` - The chart as persisted, possibly stale or malformed
    /// * `Ok(None)` - No chart has been stored for this key
    /// * `Err(RepositoryError)` - If the storage call fails
    async fn get_chart(&self, key: ChartKey) -> RepositoryResult<Option<StoredChart>>;

    /// Insert or replace the chart with the same `(year, type)` key.
    ///
    /// A failed call must leave the previously stored chart untouched.
    async fn save_chart(&self, chart: &ChartDocument) -> RepositoryResult<()>;
}
