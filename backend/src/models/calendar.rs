//! Calendar week layout for a chart year.
//!
//! Weeks are anchored to Monday..Sunday boundaries and clipped to the year, so
//! the first bucket starts on January 1 (possibly mid-week) and the last one
//! ends on December 31. All arithmetic is done on [`NaiveDate`], which carries
//! no timezone, so the layout is identical regardless of the host's local zone.

use chrono::{Datelike, NaiveDate};

use super::chart::WeekBucket;

/// Separator between the two dates of a bucket label.
pub const RANGE_SEPARATOR: &str = " to ";

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Build the authoritative week buckets for `year`, all cells empty.
///
/// Years outside the representable calendar range yield an empty list.
pub fn build_year_rows(year: i32) -> Vec<WeekBucket> {
    let (Some(mut start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(54);
    while start <= year_end {
        let dow = start.weekday().num_days_from_sunday();
        let days_to_sunday = if dow == 0 { 0 } else { 7 - dow };
        let end = start
            .checked_add_days(chrono::Days::new(u64::from(days_to_sunday)))
            .map_or(year_end, |candidate| candidate.min(year_end));

        rows.push(WeekBucket::empty(format_range(start, end)));

        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
    }
    rows
}

/// Format a bucket label: `"2025-01-01 to 2025-01-05"`.
pub fn format_range(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}{}{}",
        format_date_key(start),
        RANGE_SEPARATOR,
        format_date_key(end)
    )
}

/// Split a bucket label back into its start and end dates.
pub fn parse_range_label(label: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (start, end) = label.split_once(RANGE_SEPARATOR)?;
    Some((parse_date_key(start)?, parse_date_key(end)?))
}

/// Number of calendar days covered by a bucket label (inclusive).
pub fn bucket_day_count(label: &str) -> Option<i64> {
    let (start, end) = parse_range_label(label)?;
    Some((end - start).num_days() + 1)
}

/// Zero-padded `YYYY-MM-DD`.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Strict `YYYY-MM-DD` parser (exactly ten characters, zero padded).
pub fn parse_date_key(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_KEY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2025_first_bucket_is_partial_week() {
        let rows = build_year_rows(2025);
        assert_eq!(rows[0].range, "2025-01-01 to 2025-01-05");
        assert_eq!(rows[1].range, "2025-01-06 to 2025-01-12");
        assert_eq!(rows.last().unwrap().range, "2025-12-29 to 2025-12-31");
        assert_eq!(rows.len(), 53);
    }

    #[test]
    fn test_year_starting_on_monday_has_full_first_week() {
        // 2024-01-01 is a Monday
        let rows = build_year_rows(2024);
        assert_eq!(rows[0].range, "2024-01-01 to 2024-01-07");
        assert_eq!(rows.last().unwrap().range, "2024-12-30 to 2024-12-31");
    }

    #[test]
    fn test_year_starting_on_sunday_has_single_day_bucket() {
        // 2023-01-01 is a Sunday
        let rows = build_year_rows(2023);
        assert_eq!(rows[0].range, "2023-01-01 to 2023-01-01");
        assert_eq!(rows[1].range, "2023-01-02 to 2023-01-08");
        assert_eq!(rows.last().unwrap().range, "2023-12-25 to 2023-12-31");
    }

    #[test]
    fn test_leap_year_starting_sunday_has_54_buckets() {
        let rows = build_year_rows(2012);
        assert_eq!(rows.len(), 54);
        assert_eq!(rows.last().unwrap().range, "2012-12-31 to 2012-12-31");
    }

    #[test]
    fn test_all_cells_empty() {
        assert!(build_year_rows(2030)
            .iter()
            .all(|w| w.days.iter().all(String::is_empty)));
    }

    #[test]
    fn test_unrepresentable_year_is_empty() {
        assert!(build_year_rows(i32::MAX).is_empty());
    }

    #[test]
    fn test_parse_date_key_is_strict() {
        assert!(parse_date_key("2025-01-05").is_some());
        assert!(parse_date_key("2025-1-5").is_none());
        assert!(parse_date_key("2025-02-30").is_none());
        assert!(parse_date_key("yesterday").is_none());
    }

    #[test]
    fn test_bucket_day_count() {
        assert_eq!(bucket_day_count("2025-01-01 to 2025-01-05"), Some(5));
        assert_eq!(bucket_day_count("2025-01-06 to 2025-01-12"), Some(7));
        assert_eq!(bucket_day_count("garbage"), None);
    }
}
