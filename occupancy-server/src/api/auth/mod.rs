//! Credential discovery for the Sheets client
//!
//! Credentials come from an ordered list of providers. The first provider
//! that yields a credential wins:
//!
//! 1. an inline service-account JSON blob (`GOOGLE_SERVICE_ACCOUNT`)
//! 2. a service-account key file on disk
//! 3. an authorized-user token file on disk

pub mod credentials;
pub mod token;

pub use credentials::{AuthorizedUser, Credential, ServiceAccountKey};
pub use token::fetch_access_token;

use log::debug;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::SheetsError;
use crate::config::CredentialsConfig;

/// A single place credentials may come from
pub trait CredentialProvider: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> String;

    /// Ok(None) when this source is not set up; an error when it is set up
    /// but unusable.
    fn try_load(&self) -> Result<Option<Credential>, SheetsError>;
}

/// Service-account JSON passed inline through the environment
#[derive(Clone)]
pub struct InlineServiceAccount {
    blob: Option<String>,
}

impl InlineServiceAccount {
    pub fn new(blob: Option<String>) -> Self {
        Self { blob }
    }
}

impl CredentialProvider for InlineServiceAccount {
    fn name(&self) -> String {
        "env:GOOGLE_SERVICE_ACCOUNT".to_string()
    }

    fn try_load(&self) -> Result<Option<Credential>, SheetsError> {
        let Some(blob) = self.blob.as_deref().filter(|b| !b.trim().is_empty()) else {
            return Ok(None);
        };

        let key: ServiceAccountKey = serde_json::from_str(blob).map_err(|e| {
            SheetsError::configuration(format!(
                "Invalid GOOGLE_SERVICE_ACCOUNT environment variable: {}",
                e
            ))
        })?;
        Ok(Some(Credential::ServiceAccount(key)))
    }
}

/// Service-account key file
#[derive(Debug, Clone)]
pub struct ServiceAccountFile {
    path: PathBuf,
}

impl ServiceAccountFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for ServiceAccountFile {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn try_load(&self) -> Result<Option<Credential>, SheetsError> {
        Ok(read_json_file::<ServiceAccountKey>(&self.path)?.map(Credential::ServiceAccount))
    }
}

/// Authorized-user token file
#[derive(Debug, Clone)]
pub struct AuthorizedUserFile {
    path: PathBuf,
}

impl AuthorizedUserFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for AuthorizedUserFile {
    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn try_load(&self) -> Result<Option<Credential>, SheetsError> {
        Ok(read_json_file::<AuthorizedUser>(&self.path)?.map(Credential::AuthorizedUser))
    }
}

/// Read and parse a JSON file; Ok(None) if it does not exist
fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SheetsError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SheetsError::configuration(format!(
            "Failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    let parsed = serde_json::from_str(&content).map_err(|e| {
        SheetsError::configuration(format!(
            "Invalid credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(Some(parsed))
}

/// Providers in priority order for the given configuration
pub fn default_providers(config: &CredentialsConfig) -> Vec<Box<dyn CredentialProvider>> {
    vec![
        Box::new(InlineServiceAccount::new(config.service_account_json.clone())),
        Box::new(ServiceAccountFile::new(config.service_account_file.clone())),
        Box::new(AuthorizedUserFile::new(config.token_file.clone())),
    ]
}

/// Try each provider in order and return the first credential found
pub fn resolve_credential(
    providers: &[Box<dyn CredentialProvider>],
) -> Result<Credential, SheetsError> {
    for provider in providers {
        match provider.try_load()? {
            Some(credential) => {
                debug!(
                    "Using {} credentials from {}",
                    credential.kind(),
                    provider.name()
                );
                return Ok(credential);
            }
            None => debug!("No credentials at {}", provider.name()),
        }
    }

    Err(SheetsError::configuration(
        "No credentials found. Please set up authentication.",
    ))
}
