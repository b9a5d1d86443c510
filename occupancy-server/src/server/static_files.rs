//! Frontend file serving

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::error;
use std::path::Path;
use tower_http::services::ServeDir;

use super::AppState;

const INDEX_FILE: &str = "index.html";

/// `GET /`: the single-page frontend
pub async fn index(State(state): State<AppState>) -> Response {
    let path = state.config.frontend_dir.join(INDEX_FILE);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response(),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Frontend is unavailable").into_response()
        }
    }
}

/// Files under the frontend directory. Paths escaping the directory and
/// missing files answer 404.
pub fn assets(frontend_dir: &Path) -> ServeDir {
    ServeDir::new(frontend_dir)
}

/// API paths without a handler never fall through to the frontend
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
