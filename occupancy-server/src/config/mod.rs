//! Environment-sourced configuration

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::breakdown::BreakdownStrategy;

pub const DEFAULT_SHEET_RANGE: &str = "A:Q";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where Google credentials are looked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// Inline service-account JSON (`GOOGLE_SERVICE_ACCOUNT`)
    pub service_account_json: Option<String>,
    pub service_account_file: PathBuf,
    pub token_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            service_account_json: None,
            service_account_file: PathBuf::from("service-account.json"),
            token_file: PathBuf::from("token.json"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Spreadsheet to read; requests fail with a 500 while unset
    pub spreadsheet_id: Option<String>,
    pub sheet_range: String,
    pub credentials: CredentialsConfig,
    pub strategy: BreakdownStrategy,
    pub frontend_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_range: DEFAULT_SHEET_RANGE.to_string(),
            credentials: CredentialsConfig::default(),
            strategy: BreakdownStrategy::default(),
            frontend_dir: PathBuf::from("frontend"),
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let strategy = match get("BREAKDOWN_MODE") {
            Some(mode) => mode
                .parse::<BreakdownStrategy>()
                .map_err(anyhow::Error::msg)
                .context("Invalid BREAKDOWN_MODE")?,
            None => defaults.strategy,
        };

        let host: IpAddr = match get("HOST") {
            Some(host) => host
                .trim()
                .parse()
                .with_context(|| format!("Invalid HOST: {}", host))?,
            None => defaults.bind_addr.ip(),
        };

        let port: u16 = match get("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?,
            None => DEFAULT_PORT,
        };

        let fetch_timeout = match get("SHEETS_TIMEOUT_SECS") {
            Some(secs) => {
                let parsed: u64 = secs
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid SHEETS_TIMEOUT_SECS: {}", secs))?;
                if parsed == 0 {
                    anyhow::bail!("Invalid SHEETS_TIMEOUT_SECS: must be at least 1 second");
                }
                Duration::from_secs(parsed)
            }
            None => defaults.fetch_timeout,
        };

        Ok(Self {
            spreadsheet_id: get("SPREADSHEET_ID").map(|id| id.trim().to_string()),
            sheet_range: get("SHEET_RANGE").unwrap_or(defaults.sheet_range),
            credentials: CredentialsConfig {
                service_account_json: get("GOOGLE_SERVICE_ACCOUNT"),
                service_account_file: get("GOOGLE_SERVICE_ACCOUNT_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.credentials.service_account_file),
                token_file: get("GOOGLE_TOKEN_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.credentials.token_file),
            },
            strategy,
            frontend_dir: get("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.frontend_dir),
            bind_addr: SocketAddr::new(host, port),
            fetch_timeout,
        })
    }
}
