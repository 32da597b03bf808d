//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. Admin-only handlers take
//! [`AdminSession`] as their first extractor.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};

use super::dto::{
    CellPatchRequest, CellQuery, ChartQuery, ChartResponse, DailyData, DailyPatchRequest,
    DailyPatchResponse, DailyQuery, DailyResponse, HealthResponse, LoginRequest, OkResponse,
    ResultQuery, ResultRequest, ValueResponse,
};
use super::error::AppError;
use super::session::{verify_session, AdminSession};
use super::state::AppState;
use crate::auth::{clear_session_cookie, session_cookie};
use crate::db::services as db_services;
use crate::models::{ChartKey, ChartType, DailySlot};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Parameter parsing
// =============================================================================

fn parse_chart_type(raw: Option<&str>) -> Result<ChartType, AppError> {
    let raw = raw.unwrap_or_default();
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid type: {:?}", raw)))
}

fn parse_year(raw: Option<&str>) -> Result<i32, AppError> {
    let raw = raw.unwrap_or_default();
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| db_services::validate_year(*year).is_ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid year: {:?}", raw)))
}

fn year_from_body(year: i64) -> Result<i32, AppError> {
    i32::try_from(year)
        .ok()
        .filter(|year| db_services::validate_year(*year).is_ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid year: {}", year)))
}

fn parse_index(name: &str, raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.unwrap_or_default();
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {:?}", name, raw)))
}

/// Requested date, or the current business date when absent or blank.
fn date_or_today(state: &AppState, date: Option<String>) -> String {
    date.filter(|d| !d.trim().is_empty())
        .map(|d| d.trim().to_string())
        .unwrap_or_else(|| state.clock.current_business_date())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        ok: true,
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Chart
// =============================================================================

/// GET /api/chart?year=Y&type=T
///
/// Reconciles the stored chart on every read. Storage failures still return
/// the authoritative layout, flagged `ephemeral`.
pub async fn get_chart(
    State(state): State<AppState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> HandlerResult<ChartResponse> {
    let Query(query) = query?;
    let year = parse_year(query.year.as_deref())?;
    let chart_type = parse_chart_type(query.chart_type.as_deref())?;

    let view = db_services::load_chart(state.repository.as_ref(), ChartKey::new(year, chart_type))
        .await?;

    Ok(Json(ChartResponse {
        ok: true,
        data: view.document,
        ephemeral: view.ephemeral,
    }))
}

/// PATCH /api/chart/cell
pub async fn patch_chart_cell(
    State(state): State<AppState>,
    _admin: AdminSession,
    body: Result<Json<CellPatchRequest>, JsonRejection>,
) -> HandlerResult<ValueResponse> {
    let Json(body) = body?;
    let year = year_from_body(body.year)?;
    let chart_type = parse_chart_type(Some(&body.chart_type))?;

    let value = db_services::set_chart_cell(
        state.repository.as_ref(),
        ChartKey::new(year, chart_type),
        body.week_index,
        body.day_index,
        &body.value,
    )
    .await?;

    Ok(Json(ValueResponse::new(value)))
}

/// DELETE /api/chart/cell?year&type&weekIndex&dayIndex
pub async fn delete_chart_cell(
    State(state): State<AppState>,
    _admin: AdminSession,
    query: Result<Query<CellQuery>, QueryRejection>,
) -> HandlerResult<OkResponse> {
    let Query(query) = query?;
    let year = parse_year(query.year.as_deref())?;
    let chart_type = parse_chart_type(query.chart_type.as_deref())?;
    let week_index = parse_index("weekIndex", query.week_index.as_deref())?;
    let day_index = parse_index("dayIndex", query.day_index.as_deref())?;

    db_services::clear_chart_cell(
        state.repository.as_ref(),
        ChartKey::new(year, chart_type),
        week_index,
        day_index,
    )
    .await?;

    Ok(Json(OkResponse::ok()))
}

// =============================================================================
// Daily
// =============================================================================

/// GET /api/daily[?date=YYYY-MM-DD]
pub async fn get_daily(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<DailyQuery>, QueryRejection>,
) -> HandlerResult<DailyResponse> {
    let Query(query) = query?;
    let is_admin = verify_session(&headers, &state.sessions).is_ok();
    let date = date_or_today(&state, query.date);

    let view = db_services::load_daily(state.repository.as_ref(), &date).await?;

    Ok(Json(DailyResponse {
        ok: true,
        data: DailyData {
            date: view.record.date,
            day: view.record.day,
            night: view.record.night,
            is_admin,
            slots: state.slot_labels.clone(),
        },
        ephemeral: view.ephemeral,
    }))
}

/// PATCH /api/daily
pub async fn patch_daily(
    State(state): State<AppState>,
    _admin: AdminSession,
    body: Result<Json<DailyPatchRequest>, JsonRejection>,
) -> HandlerResult<DailyPatchResponse> {
    let Json(body) = body?;
    let slot: DailySlot = body
        .slot
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid slot: {:?}", body.slot)))?;
    let date = date_or_today(&state, body.date);

    let record =
        db_services::set_daily_slot(state.repository.as_ref(), &date, slot, &body.value).await?;

    Ok(Json(DailyPatchResponse {
        ok: true,
        data: record,
    }))
}

// =============================================================================
// Result
// =============================================================================

/// GET /api/result?type=T
pub async fn get_result(
    State(state): State<AppState>,
    query: Result<Query<ResultQuery>, QueryRejection>,
) -> HandlerResult<ValueResponse> {
    let Query(query) = query?;
    let chart_type = parse_chart_type(query.chart_type.as_deref())?;
    let view = db_services::get_result(state.repository.as_ref(), chart_type).await?;
    Ok(Json(ValueResponse::new(view.value).ephemeral(view.ephemeral)))
}

/// POST /api/result
pub async fn post_result(
    State(state): State<AppState>,
    _admin: AdminSession,
    body: Result<Json<ResultRequest>, JsonRejection>,
) -> HandlerResult<ValueResponse> {
    let Json(body) = body?;
    let chart_type = parse_chart_type(Some(&body.chart_type))?;
    let value =
        db_services::set_result(state.repository.as_ref(), chart_type, &body.value).await?;
    Ok(Json(ValueResponse::new(value)))
}

// =============================================================================
// Session
// =============================================================================

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    if !state.credentials.matches(&body.username, &body.password) {
        tracing::warn!(username = %body.username, "Failed admin login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state.sessions.issue()?;
    tracing::info!(username = %body.username, "Admin logged in");
    Ok((
        [(SET_COOKIE, session_cookie(&token, state.sessions.ttl()))],
        Json(OkResponse::ok()),
    ))
}

/// POST /api/logout
pub async fn logout() -> impl IntoResponse {
    ([(SET_COOKIE, clear_session_cookie())], Json(OkResponse::ok()))
}
