//! WebSocket upgrade + message loop. Each connection owns one session for its
//! whole lifetime. Every client action gets a single `view` reply, except
//! `create`, which first streams progress ticks.

use std::{sync::Arc, time::Duration};
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::config::CreationCfg;
use crate::creation::progress_ticks;
use crate::protocol::{Action, ControlWsMessage, ServerWsMessage};
use crate::routes::dispatch;
use crate::state::AppState;
use crate::view::render;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "tangshi_workshop", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

/// Simulated creation progress. Returns early if the client goes away.
async fn stream_progress(socket: &mut WebSocket, cfg: CreationCfg) -> Result<(), axum::Error> {
  for (percent, stage) in progress_ticks(cfg.steps) {
    tokio::time::sleep(Duration::from_millis(cfg.tick_ms)).await;
    send(socket, &ServerWsMessage::CreationProgress { percent, stage }).await?;
  }
  tokio::time::sleep(Duration::from_millis(cfg.settle_ms)).await;
  Ok(())
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let shared = state.open_session().await;
  let (id, hello) = {
    let session = shared.lock().await;
    (session.id.clone(), render(&state.store, &session))
  };
  info!(target: "tangshi_workshop", %id, "WebSocket connected");

  if send(&mut socket, &ServerWsMessage::Hello { session_id: id.clone(), view: hello }).await.is_err() {
    state.close_session(&id).await;
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = if let Ok(ctrl) = serde_json::from_str::<ControlWsMessage>(&txt) {
          match ctrl {
            ControlWsMessage::Ping => ServerWsMessage::Pong,
            ControlWsMessage::Refresh => {
              let session = shared.lock().await;
              ServerWsMessage::View { notice: None, view: render(&state.store, &session) }
            }
          }
        } else {
          match serde_json::from_str::<Action>(&txt) {
            Ok(action) => {
              debug!(target: "tangshi_workshop", %id, "WS received: {:?}", &action);
              let streams = matches!(&action, Action::Create { themes, .. } if themes.iter().any(|t| !t.trim().is_empty()));
              if streams && stream_progress(&mut socket, state.config.creation).await.is_err() {
                info!(target: "tangshi_workshop", %id, "Client left during creation; abandoning");
                break;
              }
              let (notice, view) = dispatch(&state, &shared, action).await;
              ServerWsMessage::View { notice, view }
            }
            Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
          }
        };

        if let Err(e) = send(&mut socket, &reply).await {
          error!(target: "tangshi_workshop", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }

  state.close_session(&id).await;
  info!(target: "tangshi_workshop", %id, "WebSocket disconnected");
}
