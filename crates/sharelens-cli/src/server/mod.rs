//! HTTP API.
//!
//! Every core call is synchronous, so handlers run them on tokio's blocking
//! pool and the async workers stay free for other requests.

mod error;
mod files;
mod logs;
mod search;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app::App;
use logs::PreviewLog;

pub(crate) struct ServerState {
    pub(crate) app: App,
    pub(crate) preview_log: PreviewLog,
}

impl ServerState {
    pub(crate) fn new(app: App) -> anyhow::Result<Self> {
        let preview_log = PreviewLog::new(app.config.preview_log_path()?);
        Ok(ServerState { app, preview_log })
    }
}

pub(crate) fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/files", get(files::list))
        .route("/api/files/download", get(files::download))
        .route("/api/files/text", get(files::text))
        .route("/api/files/convert/avi", get(files::convert_avi))
        .route("/api/search", get(search::search))
        .route("/api/search-indexed", get(search::search_indexed))
        .route("/api/logs/preview", post(logs::record_preview))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `bind` and serve until Ctrl-C.
pub async fn serve(app: App, bind: &str) -> anyhow::Result<()> {
    let state = Arc::new(ServerState::new(app)?);
    info!(
        roots = state.app.searcher.roots().len(),
        preview_log = %state.preview_log.path().display(),
        "Starting server"
    );

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    info!(%addr, "Server running");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> &'static str {
    "Sharelens backend is running!"
}
