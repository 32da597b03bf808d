//! High-level record access services.
//!
//! These functions hold the business rules that must be identical for every
//! storage backend: reconcile-on-read for charts, input validation before any
//! storage call, lazy creation of daily records and value normalisation.
//!
//! Read paths never fail because of storage. When the backend is unreachable
//! they fall back to a freshly built, unsaved payload flagged `ephemeral`.
//! Write paths propagate storage errors so the caller can report them.
//!
//! # Usage
//!
//! ```
//! use jai_metro::db::{services, repositories::LocalRepository};
//! use jai_metro::models::{ChartKey, ChartType};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let repo = LocalRepository::new();
//! let view = services::load_chart(&repo, ChartKey::new(2025, ChartType::Day))
//!     .await
//!     .unwrap();
//! assert_eq!(view.document.weeks.len(), 53);
//! assert!(!view.ephemeral);
//! # });
//! ```

use chrono::NaiveDate;
use log::{debug, info, warn};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    build_year_rows, format_date_key, normalize_cell_value, parse_date_key, ChartDocument, ChartKey, ChartType,
    DailyRecord, DailySlot, ResultRecord, WeekBucket, DAYS_PER_WEEK,
};
use crate::services::{reconcile, sanitize_daily_value, sanitize_result_value};

/// A chart as served to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartView {
    pub document: ChartDocument,
    /// True when storage could not be used and the document was never persisted.
    pub ephemeral: bool,
}

/// A daily record as served to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyView {
    pub record: DailyRecord,
    pub ephemeral: bool,
}

/// A headline result as served to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub value: String,
    pub ephemeral: bool,
}

// ==================== Health & Connection ====================

/// Check if the storage connection is healthy.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Validation ====================

fn invalid(operation: &str, message: impl Into<String>) -> RepositoryError {
    RepositoryError::validation_with_context(message, ErrorContext::new(operation))
}

/// Reject years that cannot label a chart.
///
/// Both ends of the year must be representable calendar dates, otherwise the
/// week layout would be truncated.
pub fn validate_year(year: i32) -> RepositoryResult<()> {
    let representable = NaiveDate::from_ymd_opt(year, 1, 1).is_some()
        && NaiveDate::from_ymd_opt(year, 12, 31).is_some();
    if year < 1 || !representable {
        return Err(invalid("validate_year", format!("Invalid year: {}", year)));
    }
    Ok(())
}

/// Validate a cell position and return the authoritative layout for its year.
///
/// Indices are taken as signed integers so that negative input from clients is
/// reported as a validation error instead of wrapping.
pub fn validate_cell_position(
    year: i32,
    week_index: i64,
    day_index: i64,
) -> RepositoryResult<(Vec<WeekBucket>, usize, usize)> {
    validate_year(year)?;

    let day = usize::try_from(day_index)
        .ok()
        .filter(|d| *d < DAYS_PER_WEEK)
        .ok_or_else(|| invalid("validate_cell", format!("Invalid dayIndex: {}", day_index)))?;

    let rows = build_year_rows(year);
    let week = usize::try_from(week_index)
        .ok()
        .filter(|w| *w < rows.len())
        .ok_or_else(|| {
            invalid(
                "validate_cell",
                format!(
                    "Invalid weekIndex: {} (year {} has {} weeks)",
                    week_index,
                    year,
                    rows.len()
                ),
            )
        })?;

    Ok((rows, week, day))
}

/// Parse a `YYYY-MM-DD` date key and return it in canonical form.
pub fn validate_date_key(date: &str) -> RepositoryResult<String> {
    parse_date_key(date)
        .map(format_date_key)
        .ok_or_else(|| invalid("validate_date", format!("Invalid date: {}", date)))
}

// ==================== Chart Operations ====================

/// Load a chart, reconciling it against the authoritative layout.
///
/// When the stored document is absent, stale or malformed the normalised
/// version is written back. Storage failures on either the read or the
/// write-back are logged and the authoritative layout is served instead.
///
/// # Returns
/// * `Err` only for an invalid year
pub async fn load_chart<R: FullRepository + ?Sized>(
    repo: &R,
    key: ChartKey,
) -> RepositoryResult<ChartView> {
    validate_year(key.year)?;
    let authoritative = build_year_rows(key.year);

    let stored = match repo.get_chart(key).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Serving ephemeral chart {}: {}", key, e);
            return Ok(ChartView {
                document: ChartDocument::new(key, authoritative),
                ephemeral: true,
            });
        }
    };

    let existed = stored.is_some();
    let reconciled = reconcile(key, stored.as_ref(), &authoritative);
    if !reconciled.changed {
        return Ok(ChartView {
            document: reconciled.normalized,
            ephemeral: false,
        });
    }

    match repo.save_chart(&reconciled.normalized).await {
        Ok(()) => {
            if existed {
                info!("Chart {} normalised and saved", key);
            } else {
                info!("Chart {} created", key);
            }
            Ok(ChartView {
                document: reconciled.normalized,
                ephemeral: false,
            })
        }
        Err(e) => {
            warn!("Failed to persist chart {}: {}", key, e);
            Ok(ChartView {
                document: reconciled.normalized,
                ephemeral: true,
            })
        }
    }
}

/// Write one cell of a chart and return the canonical value stored.
///
/// The raw value goes through the panel codec first, so legacy whitespace
/// input is saved in pipe-delimited form. A chart that does not exist yet is
/// created with the authoritative layout.
pub async fn set_chart_cell<R: FullRepository + ?Sized>(
    repo: &R,
    key: ChartKey,
    week_index: i64,
    day_index: i64,
    raw_value: &str,
) -> RepositoryResult<String> {
    let (authoritative, week, day) = validate_cell_position(key.year, week_index, day_index)?;
    let value = normalize_cell_value(raw_value);

    let stored = repo.get_chart(key).await?;
    let mut document = reconcile(key, stored.as_ref(), &authoritative).normalized;

    if !document.set_cell(week, day, value.clone()) {
        return Err(RepositoryError::internal_with_context(
            format!("Cell {}/{} missing after reconcile", week, day),
            ErrorContext::new("set_chart_cell").with_key(key),
        ));
    }

    repo.save_chart(&document).await.map_err(|e| {
        warn!("Failed to save cell {}[{}][{}]: {}", key, week, day, e);
        e
    })?;
    debug!("Cell {}[{}][{}] set to {:?}", key, week, day, value);
    Ok(value)
}

/// Clear one cell of a chart.
pub async fn clear_chart_cell<R: FullRepository + ?Sized>(
    repo: &R,
    key: ChartKey,
    week_index: i64,
    day_index: i64,
) -> RepositoryResult<()> {
    set_chart_cell(repo, key, week_index, day_index, "")
        .await
        .map(|_| ())
}

// ==================== Daily Operations ====================

/// Load the daily record for `date`, creating an empty one when absent.
///
/// # Returns
/// * `Err` only for a malformed date
pub async fn load_daily<R: FullRepository + ?Sized>(
    repo: &R,
    date: &str,
) -> RepositoryResult<DailyView> {
    let date = validate_date_key(date)?;

    match repo.get_daily(&date).await {
        Ok(Some(record)) => Ok(DailyView {
            record,
            ephemeral: false,
        }),
        Ok(None) => {
            let record = DailyRecord::empty(date.as_str());
            match repo.save_daily(&record).await {
                Ok(()) => {
                    info!("Daily record {} created", date);
                    Ok(DailyView {
                        record,
                        ephemeral: false,
                    })
                }
                Err(e) => {
                    warn!("Failed to create daily record {}: {}", date, e);
                    Ok(DailyView {
                        record,
                        ephemeral: true,
                    })
                }
            }
        }
        Err(e) => {
            warn!("Serving ephemeral daily record {}: {}", date, e);
            Ok(DailyView {
                record: DailyRecord::empty(date.as_str()),
                ephemeral: true,
            })
        }
    }
}

/// Sanitise and store one slot of a daily record, returning the updated record.
pub async fn set_daily_slot<R: FullRepository + ?Sized>(
    repo: &R,
    date: &str,
    slot: DailySlot,
    raw_value: &str,
) -> RepositoryResult<DailyRecord> {
    let date = validate_date_key(date)?;
    let mut record = repo
        .get_daily(&date)
        .await?
        .unwrap_or_else(|| DailyRecord::empty(date.as_str()));

    record.set(slot, sanitize_daily_value(raw_value));
    repo.save_daily(&record).await?;
    debug!("Daily {} slot {} updated", date, slot);
    Ok(record)
}

// ==================== Result Operations ====================

/// Current headline result for `chart_type`, empty when none was published.
///
/// A storage failure is served as an empty, ephemeral result.
pub async fn get_result<R: FullRepository + ?Sized>(
    repo: &R,
    chart_type: ChartType,
) -> RepositoryResult<ResultView> {
    match repo.get_result(chart_type).await {
        Ok(record) => Ok(ResultView {
            value: record.map(|r| r.value).unwrap_or_default(),
            ephemeral: false,
        }),
        Err(e) => {
            warn!("Serving empty result for {}: {}", chart_type, e);
            Ok(ResultView {
                value: String::new(),
                ephemeral: true,
            })
        }
    }
}

/// Sanitise and publish the headline result for `chart_type`.
pub async fn set_result<R: FullRepository + ?Sized>(
    repo: &R,
    chart_type: ChartType,
    raw_value: &str,
) -> RepositoryResult<String> {
    let record = ResultRecord::new(chart_type, sanitize_result_value(raw_value));
    repo.save_result(&record).await?;
    info!("Result for {} set to {:?}", chart_type, record.value);
    Ok(record.value)
}
