//! PostgreSQL backend on Diesel and r2d2.
//!
//! Charts, daily records and results live in three tables, each written with a
//! single-row upsert on its natural key, so a failed write leaves the previous
//! row intact. Migrations are embedded and applied when the pool is created.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` (or `PG_DATABASE_URL`) | required |
//! | `PG_POOL_MAX` / `PG_POOL_MIN` | 10 / 1 |
//! | `PG_CONN_TIMEOUT_SEC` / `PG_IDLE_TIMEOUT_SEC` | 30 / 600 |
//! | `PG_MAX_RETRIES` / `PG_RETRY_DELAY_MS` | 3 / 100, doubling per retry |

use async_trait::async_trait;
use diesel::dsl::now;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ChartRepository, DailyRepository, ErrorContext, RepositoryError, RepositoryResult,
    ResultRepository,
};
use crate::models::{
    ChartDocument, ChartKey, ChartType, DailyRecord, ResultRecord, StoredChart, StoredWeek,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Pool and retry settings.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout_sec: u64,
    /// Seconds before an idle connection is closed
    pub idle_timeout_sec: u64,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// First retry delay; doubles on each further retry
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Read the table of variables in the module docs.
    ///
    /// Only the URL is required; unset or unparsable pool settings keep their
    /// defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = ["DATABASE_URL", "PG_DATABASE_URL"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .ok_or_else(|| "set DATABASE_URL or PG_DATABASE_URL".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub max_size: u32,
    /// Statements sent to the server, including retried ones
    pub total_queries: u64,
    /// Calls that gave up with an error
    pub failed_queries: u64,
    /// Extra attempts made after a transient failure
    pub retried_operations: u64,
}

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    fn from_config(config: &PostgresConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Pause before attempt number `attempt` (0 is the first try).
    fn delay_before(&self, attempt: u32) -> Duration {
        match attempt {
            0 => Duration::ZERO,
            n => self.base_delay.saturating_mul(1u32 << (n - 1).min(16)),
        }
    }
}

#[derive(Debug, Default)]
struct QueryCounters {
    total: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    max_pool_size: u32,
    retry: RetryPolicy,
    counters: Arc<QueryCounters>,
}

impl PostgresRepository {
    /// Connect, then run pending migrations before handing out the repository.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).with_operation("migrate"))?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("migrate"),
            )
        })?;
        if !applied.is_empty() {
            log::info!("Applied {} database migration(s)", applied.len());
        }
        drop(conn);

        Ok(Self {
            pool,
            max_pool_size: config.max_pool_size,
            retry: RetryPolicy::from_config(&config),
            counters: Arc::new(QueryCounters::default()),
        })
    }

    /// Run `f` on a pooled connection inside the blocking thread pool.
    ///
    /// Checkout failures and errors marked retryable are attempted again
    /// following the repository's [`RetryPolicy`].
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let retry = self.retry;
        let counters = self.counters.clone();

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                std::thread::sleep(retry.delay_before(attempt));

                let outcome = pool.get().map_err(RepositoryError::from).and_then(|mut conn| {
                    counters.total.fetch_add(1, Ordering::Relaxed);
                    f(&mut conn)
                });

                match outcome {
                    Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                        log::debug!("Attempt {} failed, retrying: {}", attempt + 1, e);
                        counters.retried.fetch_add(1, Ordering::Relaxed);
                        attempt += 1;
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                    Ok(value) => return Ok(value),
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Blocking task failed: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            max_size: self.max_pool_size,
            total_queries: self.counters.total.load(Ordering::Relaxed),
            failed_queries: self.counters.failed.load(Ordering::Relaxed),
            retried_operations: self.counters.retried.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error, operation: &str) -> RepositoryError {
    RepositoryError::from(err).with_operation(operation)
}

fn to_json<T: serde::Serialize>(value: &T, operation: &str) -> RepositoryResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        RepositoryError::internal_with_context(
            format!("Failed to encode JSON column: {e}"),
            ErrorContext::new(operation),
        )
    })
}

/// Decode the `weeks` column leniently.
///
/// Anything that is not an array yields no weeks, and array entries that are
/// not objects become empty weeks, so reconciliation can rebuild them.
fn weeks_from_json(value: Value) -> Vec<StoredWeek> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(mut obj) => StoredWeek {
                    range: obj.remove("range").unwrap_or(Value::Null),
                    days: obj.remove("days").unwrap_or(Value::Null),
                },
                _ => StoredWeek::default(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn slot_pair_from_json(value: &Value) -> [String; 2] {
    let slot = |i: usize| {
        value
            .get(i)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    [slot(0), slot(1)]
}

fn parse_chart_type(raw: &str) -> RepositoryResult<ChartType> {
    raw.parse::<ChartType>().map_err(|e| {
        RepositoryError::internal_with_context(e, ErrorContext::new("parse_chart_type"))
    })
}

#[async_trait]
impl ChartRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(|e| map_diesel_error(e, "health_check"))
        })
        .await
    }

    async fn get_chart(&self, key: ChartKey) -> RepositoryResult<Option<StoredChart>> {
        let row = self
            .with_conn(move |conn| {
                charts::table
                    .filter(charts::year.eq(key.year))
                    .filter(charts::chart_type.eq(key.chart_type.as_str()))
                    .select(ChartRow::as_select())
                    .first::<ChartRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e, "get_chart"))
            })
            .await?;

        row.map(|row| {
            Ok(StoredChart {
                year: row.year,
                chart_type: parse_chart_type(&row.chart_type)?,
                weeks: weeks_from_json(row.weeks),
            })
        })
        .transpose()
    }

    async fn save_chart(&self, chart: &ChartDocument) -> RepositoryResult<()> {
        let row = NewChartRow {
            year: chart.year,
            chart_type: chart.chart_type.as_str().to_string(),
            weeks: to_json(&chart.weeks, "save_chart")?,
        };

        self.with_conn(move |conn| {
            diesel::insert_into(charts::table)
                .values(&row)
                .on_conflict((charts::year, charts::chart_type))
                .do_update()
                .set((
                    charts::weeks.eq(excluded(charts::weeks)),
                    charts::updated_at.eq(now),
                ))
                .execute(conn)
                .map(|_| ())
                .map_err(|e| map_diesel_error(e, "save_chart"))
        })
        .await
    }
}

#[async_trait]
impl DailyRepository for PostgresRepository {
    async fn get_daily(&self, date: &str) -> RepositoryResult<Option<DailyRecord>> {
        let date = date.to_string();
        let row = self
            .with_conn(move |conn| {
                daily_records::table
                    .find(&date)
                    .select(DailyRow::as_select())
                    .first::<DailyRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e, "get_daily"))
            })
            .await?;

        Ok(row.map(|row| DailyRecord {
            day: slot_pair_from_json(&row.day),
            night: slot_pair_from_json(&row.night),
            date: row.date,
        }))
    }

    async fn save_daily(&self, record: &DailyRecord) -> RepositoryResult<()> {
        let row = NewDailyRow {
            date: record.date.clone(),
            day: to_json(&record.day, "save_daily")?,
            night: to_json(&record.night, "save_daily")?,
        };

        self.with_conn(move |conn| {
            diesel::insert_into(daily_records::table)
                .values(&row)
                .on_conflict(daily_records::date)
                .do_update()
                .set((
                    daily_records::day.eq(excluded(daily_records::day)),
                    daily_records::night.eq(excluded(daily_records::night)),
                    daily_records::updated_at.eq(now),
                ))
                .execute(conn)
                .map(|_| ())
                .map_err(|e| map_diesel_error(e, "save_daily"))
        })
        .await
    }
}

#[async_trait]
impl ResultRepository for PostgresRepository {
    async fn get_result(&self, chart_type: ChartType) -> RepositoryResult<Option<ResultRecord>> {
        let row = self
            .with_conn(move |conn| {
                results::table
                    .find(chart_type.as_str())
                    .select(ResultRow::as_select())
                    .first::<ResultRow>(conn)
                    .optional()
                    .map_err(|e| map_diesel_error(e, "get_result"))
            })
            .await?;

        row.map(|row| {
            Ok(ResultRecord {
                chart_type: parse_chart_type(&row.chart_type)?,
                value: row.value,
            })
        })
        .transpose()
    }

    async fn save_result(&self, record: &ResultRecord) -> RepositoryResult<()> {
        let row = NewResultRow {
            chart_type: record.chart_type.as_str().to_string(),
            value: record.value.clone(),
        };

        self.with_conn(move |conn| {
            diesel::insert_into(results::table)
                .values(&row)
                .on_conflict(results::chart_type)
                .do_update()
                .set((
                    results::value.eq(excluded(results::value)),
                    results::updated_at.eq(now),
                ))
                .execute(conn)
                .map(|_| ())
                .map_err(|e| map_diesel_error(e, "save_result"))
        })
        .await
    }
}
