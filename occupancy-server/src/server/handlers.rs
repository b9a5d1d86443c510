//! JSON API handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::{error, info};
use serde_json::json;
use thiserror::Error;

use super::AppState;
use crate::api::SheetsError;
use crate::breakdown::{BreakdownError, BreakdownResult};

/// Everything that can go wrong while serving a breakdown
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("SPREADSHEET_ID is not configured")]
    MissingSpreadsheetId,

    #[error(transparent)]
    Source(#[from] SheetsError),

    #[error(transparent)]
    Breakdown(#[from] BreakdownError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "status": "error",
        });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// `GET /api/hourly_breakdown`
pub async fn hourly_breakdown(
    State(state): State<AppState>,
) -> Result<Json<BreakdownResult>, ApiError> {
    match load_breakdown(&state).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            error!("Breakdown request failed: {}", err);
            Err(err)
        }
    }
}

async fn load_breakdown(state: &AppState) -> Result<BreakdownResult, ApiError> {
    let config = &state.config;
    let spreadsheet_id = config
        .spreadsheet_id
        .as_deref()
        .ok_or(ApiError::MissingSpreadsheetId)?;

    let table = state
        .source
        .fetch_table(spreadsheet_id, &config.sheet_range)
        .await?;

    let result = config.strategy.apply(&table, Utc::now())?;
    info!(
        "Served {} breakdown (last updated {})",
        config.strategy, result.last_updated_utc
    );
    Ok(result)
}
