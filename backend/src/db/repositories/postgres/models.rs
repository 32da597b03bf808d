use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{charts, daily_records, results};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = charts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Timestamps are maintained by the database
pub struct ChartRow {
    pub year: i32,
    pub chart_type: String,
    pub weeks: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = charts)]
pub struct NewChartRow {
    pub year: i32,
    pub chart_type: String,
    pub weeks: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = daily_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct DailyRow {
    pub date: String,
    pub day: Value,
    pub night: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_records)]
pub struct NewDailyRow {
    pub date: String,
    pub day: Value,
    pub night: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct ResultRow {
    pub chart_type: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = results)]
pub struct NewResultRow {
    pub chart_type: String,
    pub value: String,
}
