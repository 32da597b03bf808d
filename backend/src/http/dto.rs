//! Data Transfer Objects for the HTTP API.
//!
//! Query strings are captured as raw strings and validated by the handlers, so
//! a bad value produces the JSON error envelope rather than a plain-text
//! rejection. Request bodies use the camelCase field names of the web client.

use serde::{Deserialize, Serialize};

use crate::models::{ChartDocument, DailyRecord, SlotLabels};

// =============================================================================
// Requests
// =============================================================================

/// Query for `GET /api/chart`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
}

/// Query for `DELETE /api/chart/cell`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellQuery {
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
    pub week_index: Option<String>,
    pub day_index: Option<String>,
}

/// Body of `PATCH /api/chart/cell`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPatchRequest {
    pub year: i64,
    #[serde(rename = "type")]
    pub chart_type: String,
    pub week_index: i64,
    pub day_index: i64,
    #[serde(default)]
    pub value: String,
}

/// Query for `GET /api/daily`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

/// Body of `PATCH /api/daily`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyPatchRequest {
    #[serde(default)]
    pub date: Option<String>,
    pub slot: String,
    pub value: String,
}

/// Query for `GET /api/result`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultQuery {
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
}

/// Body of `POST /api/result`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultRequest {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub value: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Responses
// =============================================================================

fn is_false(value: &bool) -> bool {
    !*value
}

/// `{ "ok": true }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: String,
    pub version: String,
    /// `connected`, `disconnected` or `error: ...`
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub ok: bool,
    pub data: ChartDocument,
    /// Present and `true` only when storage was unavailable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral: bool,
}

/// `{ "ok": true, "value": "..." }`, used by cell and result endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueResponse {
    pub ok: bool,
    pub value: String,
    /// Only set on result reads served without storage.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral: bool,
}

impl ValueResponse {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            ok: true,
            value: value.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyData {
    pub date: String,
    pub day: [String; 2],
    pub night: [String; 2],
    pub is_admin: bool,
    pub slots: SlotLabels,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResponse {
    pub ok: bool,
    pub data: DailyData,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPatchResponse {
    pub ok: bool,
    pub data: DailyRecord,
}
