//! Daily record storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::DailyRecord;

/// Repository trait for per-date daily records.
#[async_trait]
pub trait DailyRepository: Send + Sync {
    /// Fetch the record for a `YYYY-MM-DD` date key, `Ok(None)` if absent.
    async fn get_daily(&self, date: &str) -> RepositoryResult<Option<DailyRecord>>;

    /// Insert or replace the record with the same date.
    async fn save_daily(&self, record: &DailyRecord) -> RepositoryResult<()>;
}
