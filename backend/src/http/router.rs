//! Route table and middleware stack.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing,
//! `Cache-Control: no-store`), and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Request bodies are a handful of short fields.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the application router over `state`.
pub fn create_router(state: AppState) -> Router {
    // Same-origin in production; open CORS keeps the dev frontend working
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/chart", get(handlers::get_chart))
        .route(
            "/chart/cell",
            patch(handlers::patch_chart_cell).delete(handlers::delete_chart_cell),
        )
        .route("/daily", get(handlers::get_daily).patch(handlers::patch_daily))
        .route("/result", get(handlers::get_result).post(handlers::post_result))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::from_config(repo, &AppConfig::default()).unwrap();
        let _router = create_router(state);
    }
}
