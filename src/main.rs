//! Duocoursa · Course Generation Backend
//!
//! - Axum HTTP API (`POST /generate-course`, `GET /health`)
//! - Optional Ollama integration with rule-based fallback
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                 : u16 (default 8000)
//!   AI_AVAILABLE         : "true" enables the generative path (default true)
//!   OLLAMA_HOST          : default "http://localhost:11434"
//!   AI_MODEL             : default "mistral"
//!   TEMPERATURE          : default 0.7
//!   MAX_TOKENS           : default 2000
//!   MAX_RETRIES          : attempts per section, default 3
//!   REQUEST_TIMEOUT_SECS : per-attempt deadline, default 120
//!   COURSE_CONFIG_PATH   : path to TOML config (prompt overrides)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use duocoursa_backend::config::{load_course_config_from_env, Settings};
use duocoursa_backend::routes::build_router;
use duocoursa_backend::state::AppState;
use duocoursa_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let settings = Settings::from_env()?;
    let prompts = load_course_config_from_env().map(|c| c.prompts).unwrap_or_default();

    let state = Arc::new(AppState::new(settings, prompts));
    let app = build_router(state);

    let addr: SocketAddr = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

    let listener = TcpListener::bind(addr).await?;
    info!(target: "duocoursa_backend", %addr, "HTTP server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(target: "duocoursa_backend", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(target: "duocoursa_backend", error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target: "duocoursa_backend", "Shutdown signal received");
}
