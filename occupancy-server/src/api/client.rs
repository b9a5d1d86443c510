//! Google Sheets values client

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::time::Duration;

use super::auth::{CredentialProvider, fetch_access_token, resolve_credential};
use super::error::SheetsError;
use super::models::{GoogleErrorBody, RawTable, ValueRange};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Anything that can hand back the rows of a spreadsheet range
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_table(&self, spreadsheet_id: &str, range: &str)
    -> Result<RawTable, SheetsError>;
}

/// Reads cell values through the Sheets v4 REST API.
///
/// Credentials are resolved and exchanged for a token on every fetch; nothing
/// is cached between requests.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl SheetsClient {
    /// Create a client whose outbound requests time out after `timeout`
    pub fn new(
        providers: Vec<Box<dyn CredentialProvider>>,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: SHEETS_API_BASE.to_string(),
            providers,
        })
    }

    /// Point the client at another API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

#[async_trait]
impl TableSource for SheetsClient {
    async fn fetch_table(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<RawTable, SheetsError> {
        let credential = resolve_credential(&self.providers)?;
        let token = fetch_access_token(&self.http, &credential, Utc::now()).await?;
        if let Some(expires_at) = token.expires_at {
            debug!("Access token valid until {}", expires_at);
        }

        let url = self.values_url(spreadsheet_id, range);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token.token)
            .send()
            .await
            .map_err(|e| SheetsError::unavailable(format!("Sheets request failed: {}", e), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<GoogleErrorBody>(&body)
                .map(|b| b.error.describe())
                .unwrap_or(body);
            return Err(SheetsError::rejected(
                format!("Sheets API returned {}: {}", status, detail),
                status.as_u16(),
            ));
        }

        let value_range: ValueRange = response.json().await.map_err(|e| {
            SheetsError::unavailable(format!("Invalid Sheets API response: {}", e), e)
        })?;

        debug!(
            "Sheets returned range {} ({})",
            value_range.range.as_deref().unwrap_or(range),
            value_range.major_dimension.as_deref().unwrap_or("ROWS")
        );
        let table = value_range.into_table();
        if table.is_empty() {
            return Err(SheetsError::EmptyData {
                spreadsheet_id: spreadsheet_id.to_string(),
                range: range.to_string(),
            });
        }

        info!("Received {} rows from Google Sheets", table.len());
        if let Some(header) = table.header() {
            debug!("First row (headers): {:?}", header);
        }

        Ok(table)
    }
}
