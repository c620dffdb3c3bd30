//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::report::{report_text, REPORT_FILE_NAME};
use crate::routes::dispatch;
use crate::state::AppState;
use crate::util::attachment_disposition;
use crate::view::render;

fn unknown_session(id: &str) -> Response {
  (StatusCode::NOT_FOUND, Json(ErrorOut { error: format!("Unknown session: {id}") })).into_response()
}

fn text_attachment(file_name: &str, body: String) -> Response {
  (
    [
      (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
      (header::CONTENT_DISPOSITION, attachment_disposition(file_name)),
    ],
    body,
  )
    .into_response()
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_poems(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let poems: Vec<PoemSummary> = state
    .store
    .records()
    .iter()
    .enumerate()
    .map(|(index, p)| PoemSummary {
      index,
      title: p.title.clone(),
      author: p.author.clone(),
      dynasty: p.dynasty.clone(),
    })
    .collect();
  Json(poems)
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(StatsOut {
    stats: state.store.stats(),
    rejected: state.store.rejected().len(),
    warning: state.store.warning().map(str::to_string),
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_open_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let shared = state.open_session().await;
  let session = shared.lock().await;
  Json(SessionOut { session_id: session.id.clone(), view: render(&state.store, &session) })
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_get_view(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  let Some(shared) = state.session(&id).await else { return unknown_session(&id) };
  let session = shared.lock().await;
  Json(render(&state.store, &session)).into_response()
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_post_action(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(action): Json<Action>,
) -> Response {
  let Some(shared) = state.session(&id).await else { return unknown_session(&id) };
  let (notice, view) = dispatch(&state, &shared, action).await;
  info!(target: "tangshi_workshop", %id, notice = ?notice.as_ref().map(|n| n.level), "HTTP action applied");
  Json(ActionOut { notice, view }).into_response()
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_export_poem(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  let Some(shared) = state.session(&id).await else { return unknown_session(&id) };
  let session = shared.lock().await;
  match &session.last_creation {
    Some(poem) => text_attachment(&format!("{}.txt", poem.title), poem.export_text()),
    None => (StatusCode::NOT_FOUND, Json(ErrorOut { error: "还没有创作诗歌".into() })).into_response(),
  }
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_export_report(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
  let Some(shared) = state.session(&id).await else { return unknown_session(&id) };
  let session = shared.lock().await;
  let body = report_text(&state.store, &session.state, &chrono::Local::now());
  info!(target: "tangshi_workshop", %id, bytes = body.len(), "Report exported");
  text_attachment(REPORT_FILE_NAME, body)
}
