//! Repository used when the configured backend could not be initialised.
//!
//! Every call fails with [`RepositoryError::NotConnected`]. Reads therefore
//! degrade to ephemeral payloads and writes are refused, instead of the process
//! refusing to start.

use async_trait::async_trait;

use crate::db::repository::*;
use crate::models::{ChartDocument, ChartKey, ChartType, DailyRecord, ResultRecord, StoredChart};

#[derive(Debug, Clone)]
pub struct OfflineRepository {
    reason: String,
}

impl OfflineRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self, operation: &str) -> RepositoryResult<T> {
        Err(RepositoryError::not_connected_with_context(
            self.reason.clone(),
            ErrorContext::new(operation),
        ))
    }
}

#[async_trait]
impl ChartRepository for OfflineRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(false)
    }

    async fn get_chart(&self, _key: ChartKey) -> RepositoryResult<Option<StoredChart>> {
        self.fail("get_chart")
    }

    async fn save_chart(&self, _chart: &ChartDocument) -> RepositoryResult<()> {
        self.fail("save_chart")
    }
}

#[async_trait]
impl DailyRepository for OfflineRepository {
    async fn get_daily(&self, _date: &str) -> RepositoryResult<Option<DailyRecord>> {
        self.fail("get_daily")
    }

    async fn save_daily(&self, _record: &DailyRecord) -> RepositoryResult<()> {
        self.fail("save_daily")
    }
}

#[async_trait]
impl ResultRepository for OfflineRepository {
    async fn get_result(&self, _chart_type: ChartType) -> RepositoryResult<Option<ResultRecord>> {
        self.fail("get_result")
    }

    async fn save_result(&self, _record: &ResultRecord) -> RepositoryResult<()> {
        self.fail("save_result")
    }
}
