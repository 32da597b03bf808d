//! In-memory backend for development and tests.
//!
//! Stores the loose [`StoredChart`] shape, so tests can seed documents that
//! only reconciliation can repair.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{ChartDocument, ChartKey, ChartType, DailyRecord, ResultRecord, StoredChart};

/// In-memory local repository.
///
/// Clones share the same underlying data.
///
/// # Example
/// ```
/// use jai_metro::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// let view = repo.clone();
/// assert_eq!(view.chart_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    charts: HashMap<ChartKey, StoredChart>,
    daily: HashMap<String, DailyRecord>,
    results: HashMap<ChartType, ResultRecord>,
    /// When false every call fails as if the database were down
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            charts: HashMap::new(),
            daily: HashMap::new(),
            results: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Empty and healthy.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Store a chart exactly as given, bypassing normalization.
    ///
    /// Used to seed stale or malformed documents.
    pub fn insert_raw_chart(&self, chart: StoredChart) {
        self.data.write().charts.insert(chart.key(), chart);
    }

    /// Read back the stored form of a chart without any health check.
    pub fn raw_chart(&self, key: ChartKey) -> Option<StoredChart> {
        self.data.read().charts.get(&key).cloned()
    }

    /// While unhealthy every read and write fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Drop every record; the health flag is kept.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn chart_count(&self) -> usize {
        self.data.read().charts.len()
    }

    pub fn daily_count(&self) -> usize {
        self.data.read().daily.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation).retryable(),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChartRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_chart(&self, key: ChartKey) -> RepositoryResult<Option<StoredChart>> {
        self.check_health("get_chart")?;
        Ok(self.data.read().charts.get(&key).cloned())
    }

    async fn save_chart(&self, chart: &ChartDocument) -> RepositoryResult<()> {
        self.check_health("save_chart")?;
        self.data
            .write()
            .charts
            .insert(chart.key(), StoredChart::from(chart));
        Ok(())
    }
}

#[async_trait]
impl DailyRepository for LocalRepository {
    async fn get_daily(&self, date: &str) -> RepositoryResult<Option<DailyRecord>> {
        self.check_health("get_daily")?;
        Ok(self.data.read().daily.get(date).cloned())
    }

    async fn save_daily(&self, record: &DailyRecord) -> RepositoryResult<()> {
        self.check_health("save_daily")?;
        self.data
            .write()
            .daily
            .insert(record.date.clone(), record.clone());
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for LocalRepository {
    async fn get_result(&self, chart_type: ChartType) -> RepositoryResult<Option<ResultRecord>> {
        self.check_health("get_result")?;
        Ok(self.data.read().results.get(&chart_type).cloned())
    }

    async fn save_result(&self, record: &ResultRecord) -> RepositoryResult<()> {
        self.check_health("save_result")?;
        self.data
            .write()
            .results
            .insert(record.chart_type, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{build_year_rows, WeekBucket};

    fn chart(year: i32) -> ChartDocument {
        ChartDocument::new(ChartKey::new(year, ChartType::Night), build_year_rows(year))
    }

    #[tokio::test]
    async fn test_chart_upsert_replaces_by_key() {
        let repo = LocalRepository::new();
        let mut doc = chart(2025);
        repo.save_chart(&doc).await.unwrap();
        doc.weeks.push(WeekBucket::empty("extra"));
        repo.save_chart(&doc).await.unwrap();

        assert_eq!(repo.chart_count(), 1);
        let stored = repo.get_chart(doc.key()).await.unwrap().unwrap();
        assert_eq!(stored.weeks.len(), doc.weeks.len());
    }

    #[tokio::test]
    async fn test_absent_records_are_none() {
        let repo = LocalRepository::new();
        assert!(repo.get_chart(ChartKey::new(1999, ChartType::Day)).await.unwrap().is_none());
        assert!(repo.get_daily("2025-01-01").await.unwrap().is_none());
        assert!(repo.get_result(ChartType::Day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_reads_and_writes() {
        let repo = LocalRepository::new();
        repo.save_chart(&chart(2025)).await.unwrap();
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo.get_chart(ChartKey::new(2025, ChartType::Night)).await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(repo.save_daily(&DailyRecord::empty("2025-01-01")).await.is_err());

        // Failed writes leave committed data alone
        repo.set_healthy(true);
        assert!(repo.get_chart(ChartKey::new(2025, ChartType::Night)).await.unwrap().is_some());
        assert_eq!(repo.daily_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let repo = LocalRepository::new();
        repo.save_result(&ResultRecord::new(ChartType::Day, "12")).await.unwrap();
        repo.set_healthy(false);
        repo.clear();
        repo.set_healthy(true);
        assert!(repo.get_result(ChartType::Day).await.unwrap().is_none());
    }
}
