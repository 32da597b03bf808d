//! Business-day clock for the daily numbers record.
//!
//! Results are published at fixed local (IST) times. A request made before the
//! rollover hour resolves to the previous calendar day, so early visitors see
//! the last complete day instead of an empty one.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use thiserror::Error;

use super::calendar::format_date_key;

/// Indian Standard Time, UTC+05:30.
pub const IST_UTC_OFFSET_MINUTES: i32 = 330;

/// Local hour at which the business date advances to the calendar date.
///
/// Requests at local times `00:00..01:00` still belong to the previous day.
pub const DEFAULT_ROLLOVER_HOUR: u32 = 1;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessDayError {
    #[error("UTC offset of {0} minutes is outside the supported range of +/-14h")]
    InvalidOffset(i32),
    #[error("rollover hour {0} must be between 0 and 23")]
    InvalidRolloverHour(u32),
}

/// Computes the date key of "today's" daily record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessDayClock {
    utc_offset_minutes: i32,
    rollover_hour: u32,
}

impl BusinessDayClock {
    pub fn new(utc_offset_minutes: i32, rollover_hour: u32) -> Result<Self, BusinessDayError> {
        if utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(BusinessDayError::InvalidOffset(utc_offset_minutes));
        }
        if rollover_hour > 23 {
            return Err(BusinessDayError::InvalidRolloverHour(rollover_hour));
        }
        Ok(Self {
            utc_offset_minutes,
            rollover_hour,
        })
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    pub fn rollover_hour(&self) -> u32 {
        self.rollover_hour
    }

    /// Business date for the given instant.
    pub fn business_date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        // Shift the instant and read its UTC fields as local wall-clock fields.
        let local = instant.naive_utc() + Duration::minutes(i64::from(self.utc_offset_minutes));
        let date = local.date();
        if local.hour() < self.rollover_hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    /// `YYYY-MM-DD` key for the given instant.
    pub fn business_date_key_at(&self, instant: DateTime<Utc>) -> String {
        format_date_key(self.business_date_at(instant))
    }

    /// `YYYY-MM-DD` key for the current wall-clock time.
    pub fn current_business_date(&self) -> String {
        self.business_date_key_at(Utc::now())
    }
}

impl Default for BusinessDayClock {
    fn default() -> Self {
        Self {
            utc_offset_minutes: IST_UTC_OFFSET_MINUTES,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
        }
    }
}
