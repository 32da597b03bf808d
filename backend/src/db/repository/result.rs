//! Headline result storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{ChartType, ResultRecord};

#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Fetch the current result for a draw type, `Ok(None)` if never set.
    async fn get_result(&self, chart_type: ChartType) -> RepositoryResult<Option<ResultRecord>>;

    /// Insert or replace the result for its draw type.
    async fn save_result(&self, record: &ResultRecord) -> RepositoryResult<()>;
}
