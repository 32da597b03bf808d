//! Headline result shown for each draw type.

use serde::{Deserialize, Serialize};

use super::chart::ChartType;

/// Latest announced value for one draw type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub value: String,
}

impl ResultRecord {
    pub fn new(chart_type: ChartType, value: impl Into<String>) -> Self {
        Self {
            chart_type,
            value: value.into(),
        }
    }
}
