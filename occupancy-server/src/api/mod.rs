//! Google Sheets data source
//!
//! Fetches the raw rows of a spreadsheet range. Credentials are discovered
//! through an ordered list of providers and exchanged for an OAuth token on
//! each fetch.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{CredentialProvider, default_providers};
pub use client::{SheetsClient, TableSource};
pub use error::SheetsError;
pub use models::RawTable;
