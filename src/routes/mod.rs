//! Router assembly: HTTP endpoints, static page, upload limit, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - form session API under `/api/v1/forms/...`
/// - prior-quiz summaries at `/api/v1/quizzes`
/// - the single page from `static_dir` with index fallback
/// - request bodies capped at `max_upload_bytes`
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(format!("{static_dir}/index.html")));
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_get_catalog))
        .route("/api/v1/forms", post(http::http_create_form))
        .route("/api/v1/forms/:id", get(http::http_get_form).delete(http::http_delete_form))
        .route("/api/v1/forms/:id/groups", post(http::http_append_group))
        .route(
            "/api/v1/forms/:id/groups/:index",
            delete(http::http_remove_group).put(http::http_update_group),
        )
        .route("/api/v1/forms/:id/files", post(http::http_add_file))
        .route("/api/v1/forms/:id/files/:index", delete(http::http_remove_file))
        .route("/api/v1/forms/:id/submit", post(http::http_submit_form))
        .route("/api/v1/quizzes", get(http::http_list_quizzes))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .fallback_service(static_service)
}
