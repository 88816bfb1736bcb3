//! QuizCraft · quiz request service
//!
//! - Axum HTTP API for the QuizCraft page (form sessions, uploads, history)
//! - Static single page (./static/index.html)
//! - Forwards quiz requests to the generation backend
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   QUIZCRAFT_CONFIG_PATH  : path to TOML config
//!   QUIZCRAFT_API_BASE_URL : generation backend, default "http://localhost:8000"
//!   QUIZCRAFT_STATIC_DIR   : directory of the page, default "./static"
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use quizcraft::config::AppConfig;
use quizcraft::routes::build_router;
use quizcraft::state::AppState;
use quizcraft::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::load_from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  let state = Arc::new(AppState::new(config)?);
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizcraft", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "quizcraft", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "quizcraft", error = %e, "Could not listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "quizcraft", "Shutdown requested");
}
