//! Daily numbers record keyed by business date.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two day-draw values and two night-draw values published on one business date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// `YYYY-MM-DD` business date
    pub date: String,
    pub day: [String; 2],
    pub night: [String; 2],
}

impl DailyRecord {
    /// An empty record for `date`.
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, slot: DailySlot) -> &str {
        match slot {
            DailySlot::Day1 => &self.day[0],
            DailySlot::Day2 => &self.day[1],
            DailySlot::Night1 => &self.night[0],
            DailySlot::Night2 => &self.night[1],
        }
    }

    pub fn set(&mut self, slot: DailySlot, value: String) {
        let cell = match slot {
            DailySlot::Day1 => &mut self.day[0],
            DailySlot::Day2 => &mut self.day[1],
            DailySlot::Night1 => &mut self.night[0],
            DailySlot::Night2 => &mut self.night[1],
        };
        *cell = value;
    }
}

/// One of the four published values of a business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailySlot {
    Day1,
    Day2,
    Night1,
    Night2,
}

impl DailySlot {
    pub const ALL: [DailySlot; 4] = [
        DailySlot::Day1,
        DailySlot::Day2,
        DailySlot::Night1,
        DailySlot::Night2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DailySlot::Day1 => "day1",
            DailySlot::Day2 => "day2",
            DailySlot::Night1 => "night1",
            DailySlot::Night2 => "night2",
        }
    }
}

impl fmt::Display for DailySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DailySlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DailySlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| format!("Unknown daily slot: {}", s))
    }
}

/// Publication times shown next to the daily values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLabels {
    pub day: [String; 2],
    pub night: [String; 2],
}

impl Default for SlotLabels {
    fn default() -> Self {
        Self {
            day: ["11:00:00 AM".to_string(), "12:00:00 PM".to_string()],
            night: ["06:30:00 PM".to_string(), "07:30:00 PM".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_only_touches_one_slot() {
        let mut record = DailyRecord::empty("2025-05-01");
        record.set(DailySlot::Night2, "7".to_string());
        assert_eq!(record.night, ["".to_string(), "7".to_string()]);
        assert_eq!(record.day, [String::new(), String::new()]);
        assert_eq!(record.get(DailySlot::Night2), "7");
    }

    #[test]
    fn test_slot_serde_names() {
        assert_eq!(serde_json::to_value(DailySlot::Day2).unwrap(), "day2");
        let slot: DailySlot = serde_json::from_str("\"night1\"").unwrap();
        assert_eq!(slot, DailySlot::Night1);
        assert_eq!("night2".parse::<DailySlot>().unwrap(), DailySlot::Night2);
        assert!("day3".parse::<DailySlot>().is_err());
    }
}
