//! Chart documents and their persisted (loosely typed) form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Number of day cells in a week bucket (Monday through Sunday).
pub const DAYS_PER_WEEK: usize = 7;

/// Which of the two daily draws a chart tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Day,
    Night,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Day => "day",
            ChartType::Night => "night",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    /// Parse a chart type, ignoring ASCII case ("Day", "NIGHT", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ChartType::Day),
            "night" => Ok(ChartType::Night),
            _ => Err(format!("Unknown chart type: {}", s)),
        }
    }
}

/// Unique key of a chart document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartKey {
    pub year: i32,
    pub chart_type: ChartType,
}

impl ChartKey {
    pub fn new(year: i32, chart_type: ChartType) -> Self {
        Self { year, chart_type }
    }
}

impl fmt::Display for ChartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.chart_type)
    }
}

/// One calendar week's row in a chart.
///
/// `days[0]` is Monday and `days[6]` is Sunday. Empty strings mean no value
/// has been recorded for that day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekBucket {
    /// `"YYYY-MM-DD to YYYY-MM-DD"`
    pub range: String,
    pub days: [String; DAYS_PER_WEEK],
}

impl WeekBucket {
    /// A bucket with the given label and all seven cells empty.
    pub fn empty(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            days: Default::default(),
        }
    }
}

/// A full year's grid for one chart type, in its normalized shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub year: i32,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub weeks: Vec<WeekBucket>,
}

impl ChartDocument {
    pub fn new(key: ChartKey, weeks: Vec<WeekBucket>) -> Self {
        Self {
            year: key.year,
            chart_type: key.chart_type,
            weeks,
        }
    }

    pub fn key(&self) -> ChartKey {
        ChartKey::new(self.year, self.chart_type)
    }

    /// Value of a single cell, if the coordinates exist.
    pub fn cell(&self, week_index: usize, day_index: usize) -> Option<&str> {
        self.weeks
            .get(week_index)
            .and_then(|w| w.days.get(day_index))
            .map(String::as_str)
    }

    /// Overwrite a single cell. Returns `false` when the coordinates are out of range.
    pub fn set_cell(&mut self, week_index: usize, day_index: usize, value: String) -> bool {
        match self
            .weeks
            .get_mut(week_index)
            .and_then(|w| w.days.get_mut(day_index))
        {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

/// A week row as it was persisted.
///
/// Older revisions of the chart layout, manual edits and partial writes can
/// leave rows with a missing label, a `days` value that is not an array, arrays
/// of the wrong length, or non-string entries. The reconciler reads this shape
/// and never trusts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredWeek {
    #[serde(default)]
    pub range: Value,
    #[serde(default)]
    pub days: Value,
}

impl StoredWeek {
    pub fn range_label(&self) -> Option<&str> {
        self.range.as_str()
    }

    /// The stored day entry at `index`, when it exists and is a string.
    pub fn day(&self, index: usize) -> Option<&str> {
        self.days
            .as_array()
            .and_then(|days| days.get(index))
            .and_then(Value::as_str)
    }

    /// True when `days` is exactly seven strings.
    pub fn has_well_formed_days(&self) -> bool {
        self.days
            .as_array()
            .map(|days| days.len() == DAYS_PER_WEEK && days.iter().all(Value::is_string))
            .unwrap_or(false)
    }
}

impl From<&WeekBucket> for StoredWeek {
    fn from(week: &WeekBucket) -> Self {
        Self {
            range: Value::String(week.range.clone()),
            days: Value::Array(week.days.iter().cloned().map(Value::String).collect()),
        }
    }
}

/// A chart document as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChart {
    pub year: i32,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default)]
    pub weeks: Vec<StoredWeek>,
}

impl StoredChart {
    pub fn key(&self) -> ChartKey {
        ChartKey::new(self.year, self.chart_type)
    }
}

impl From<&ChartDocument> for StoredChart {
    fn from(doc: &ChartDocument) -> Self {
        Self {
            year: doc.year,
            chart_type: doc.chart_type,
            weeks: doc.weeks.iter().map(StoredWeek::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chart_type_parse_is_case_insensitive() {
        assert_eq!("day".parse::<ChartType>().unwrap(), ChartType::Day);
        assert_eq!("NIGHT".parse::<ChartType>().unwrap(), ChartType::Night);
        assert!("noon".parse::<ChartType>().is_err());
        assert!("".parse::<ChartType>().is_err());
    }

    #[test]
    fn test_chart_document_serializes_type_field() {
        let doc = ChartDocument::new(
            ChartKey::new(2025, ChartType::Night),
            vec![WeekBucket::empty("2025-01-01 to 2025-01-05")],
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["type"], "night");
        assert_eq!(value["year"], 2025);
        assert_eq!(value["weeks"][0]["days"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_set_cell_bounds() {
        let mut doc = ChartDocument::new(
            ChartKey::new(2025, ChartType::Day),
            vec![WeekBucket::empty("r")],
        );
        assert!(doc.set_cell(0, 6, "42".to_string()));
        assert_eq!(doc.cell(0, 6), Some("42"));
        assert!(!doc.set_cell(0, 7, "x".to_string()));
        assert!(!doc.set_cell(1, 0, "x".to_string()));
    }

    #[test]
    fn test_stored_week_tolerates_malformed_rows() {
        let week: StoredWeek = serde_json::from_value(json!({ "days": ["1", 2, null] })).unwrap();
        assert_eq!(week.range_label(), None);
        assert_eq!(week.day(0), Some("1"));
        assert_eq!(week.day(1), None);
        assert_eq!(week.day(5), None);
        assert!(!week.has_well_formed_days());

        let week: StoredWeek = serde_json::from_value(json!({ "range": "x", "days": "oops" })).unwrap();
        assert_eq!(week.day(0), None);
        assert!(!week.has_well_formed_days());
    }

    #[test]
    fn test_stored_chart_from_document_is_well_formed() {
        let doc = ChartDocument::new(
            ChartKey::new(2024, ChartType::Day),
            vec![WeekBucket::empty("a"), WeekBucket::empty("b")],
        );
        let stored = StoredChart::from(&doc);
        assert_eq!(stored.key(), doc.key());
        assert!(stored.weeks.iter().all(StoredWeek::has_well_formed_days));
        assert_eq!(stored.weeks[1].range_label(), Some("b"));
    }
}
