//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::logic::apply_action;
use crate::protocol::{Action, Notice};
use crate::state::{AppState, SharedSession};
use crate::view::{render, View};

pub mod http;
pub mod ws;

/// Apply one action under the session lock and re-render from the new state.
pub async fn dispatch(state: &AppState, session: &SharedSession, action: Action) -> (Option<Notice>, View) {
    let mut guard = session.lock().await;
    guard.touch();
    let notice = apply_action(&state.store, &mut guard, action);
    let view = render(&state.store, &guard);
    (notice, view)
}

/// Build the application router with:
/// - WebSocket at `/ws` (one session per connection)
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/poems", get(http::http_list_poems))
        .route("/api/v1/stats", get(http::http_stats))
        .route("/api/v1/session", post(http::http_open_session))
        .route("/api/v1/session/:id/view", get(http::http_get_view))
        .route("/api/v1/session/:id/action", post(http::http_post_action))
        .route("/api/v1/session/:id/export/poem", get(http::http_export_poem))
        .route("/api/v1/session/:id/export/report", get(http::http_export_report))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
