//! 唐诗工坊 · Tang poetry workshop backend
//!
//! - Axum HTTP + WebSocket API over per-client sessions
//! - Poem appreciation, fill-in-the-blank challenges, template-based creation
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   WORKSHOP_CONFIG_PATH  : path to TOML config (grading, history, creation pacing)
//!   POEMS_PATH            : poem dataset, overrides `data_path` (default "data/poems.json")
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod store;
mod session;
mod quiz;
mod creation;
mod appreciation;
mod pinyin;
mod report;
mod state;
mod protocol;
mod view;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config + poem store; a bad dataset degrades to an empty store with a warning.
  let state = Arc::new(AppState::new());
  state.clone().spawn_idle_sweeper();

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "tangshi_workshop", %addr, poems = state.store.len(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
