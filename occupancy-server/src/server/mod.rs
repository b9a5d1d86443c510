//! HTTP layer
//!
//! Routes:
//! - `GET /api/hourly_breakdown`: breakdown JSON, or `{error, status}` with 500
//! - `GET /`: frontend `index.html`
//! - `GET /<path>`: frontend assets (never under `/api/`)

pub mod handlers;
pub mod static_files;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{any, get};
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::api::{SheetsClient, TableSource, default_providers};
use crate::config::Config;

/// Shared per-process state. Holds no data between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn TableSource>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn TableSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let assets = static_files::assets(&state.config.frontend_dir);
    Router::new()
        .route("/api/hourly_breakdown", get(handlers::hourly_breakdown))
        .route("/api", any(static_files::not_found))
        .route("/api/{*rest}", any(static_files::not_found))
        .route("/", get(static_files::index))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let providers = default_providers(&config.credentials);
    let client = SheetsClient::new(providers, config.fetch_timeout)
        .context("Failed to create Sheets client")?;

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, Arc::new(client));

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
