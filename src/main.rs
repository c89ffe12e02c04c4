//! Quizzz · MCQ Import Backend
//!
//! - Axum HTTP API: docx upload + extraction, quiz store, play sessions
//! - In-memory persistence (no database; ids are process-local UUIDs)
//!
//! Important env variables:
//!   PORT        : u16 (overrides config; default 8000)
//!   SERVER_CONFIG_PATH : path to TOML config (port, CORS origins, upload cap)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod error;
mod extract;
mod reader;
mod state;
mod protocol;
mod routes;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (config + in-memory quiz store).
  let state = AppState::new();
  let config_port = state.config.port;

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or fall back to the configured one.
  let port = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .unwrap_or(config_port);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizzz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
