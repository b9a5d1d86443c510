//! Error types for the Sheets data source.

use thiserror::Error;

/// Failures while authenticating against or reading from Google Sheets.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Missing or malformed credentials or settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token endpoint or the Sheets API could not be reached or refused
    /// the request.
    #[error("spreadsheet source unavailable: {message}")]
    SourceUnavailable {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The requested range holds no rows.
    #[error("No data found in spreadsheet {spreadsheet_id} (range {range})")]
    EmptyData {
        spreadsheet_id: String,
        range: String,
    },
}

impl SheetsError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        SheetsError::Configuration(message.into())
    }

    pub(crate) fn unavailable(message: impl Into<String>, source: reqwest::Error) -> Self {
        SheetsError::SourceUnavailable {
            message: message.into(),
            status: source.status().map(|s| s.as_u16()),
            source: Some(source),
        }
    }

    pub(crate) fn rejected(message: impl Into<String>, status: u16) -> Self {
        SheetsError::SourceUnavailable {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }
}
