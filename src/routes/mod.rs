//! Router assembly: HTTP endpoints, upload body limit, CORS, and HTTP tracing.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Upload size cap from config (multipart bodies)
/// - CORS: configured origins with credentials, or any-origin when none
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/upload", post(http::http_upload_docx))
        .route("/api/v1/quizzes", post(http::http_create_quiz))
        .route("/api/v1/quizzes/:quiz_id", get(http::http_get_quiz))
        .route("/api/v1/plays", post(http::http_start_play))
        .route("/api/v1/plays/:session_id", get(http::http_get_play))
        .route("/api/v1/plays/:session_id/answers", post(http::http_submit_answer))
        .route("/api/v1/plays/:session_id/pause", post(http::http_pause_play))
        .route("/api/v1/plays/:session_id/resume", post(http::http_resume_play))
        .with_state(state)
        .layer(body_limit)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Credentials require exact origins; tower-http rejects `Any` + credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if parsed.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
