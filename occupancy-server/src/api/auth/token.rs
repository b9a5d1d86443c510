//! Access-token acquisition
//!
//! Service accounts sign a JWT assertion and trade it for a token at the
//! OAuth endpoint. Authorized users reuse their stored token while it is
//! fresh and fall back to the refresh-token grant.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use serde::{Deserialize, Serialize};

use super::credentials::{AuthorizedUser, Credential, ServiceAccountKey};
use crate::api::error::SheetsError;

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Lifetime requested for signed assertions
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Stored tokens closer than this to expiry are refreshed instead of reused
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token for the Sheets API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Obtain a bearer token for the given credential
pub async fn fetch_access_token(
    http: &reqwest::Client,
    credential: &Credential,
    now: DateTime<Utc>,
) -> Result<AccessToken, SheetsError> {
    match credential {
        Credential::ServiceAccount(key) => {
            let assertion = sign_assertion(key, now)?;
            exchange(
                http,
                &key.token_uri,
                &[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())],
                now,
            )
            .await
        }
        Credential::AuthorizedUser(user) => {
            if let Some(token) = stored_token_if_fresh(user, now) {
                debug!("Reusing stored access token");
                return Ok(token);
            }

            let (refresh_token, client_id, client_secret) = refresh_material(user)?;
            exchange(
                http,
                &user.token_uri,
                &[
                    ("grant_type", REFRESH_TOKEN_GRANT),
                    ("refresh_token", refresh_token),
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                ],
                now,
            )
            .await
        }
    }
}

/// Build the RS256-signed JWT assertion for a service account
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SheetsError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
        SheetsError::configuration(format!("Invalid service account private key: {}", e))
    })?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SHEETS_READONLY_SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    encode(&header, &claims, &encoding_key).map_err(|e| {
        SheetsError::configuration(format!("Failed to sign service account assertion: {}", e))
    })
}

/// The stored token, if it is still valid for a while
fn stored_token_if_fresh(user: &AuthorizedUser, now: DateTime<Utc>) -> Option<AccessToken> {
    let token = user.token.as_deref().filter(|t| !t.is_empty())?;
    let expiry = user.expiry.as_deref()?;
    let expires_at = DateTime::parse_from_rfc3339(expiry).ok()?.with_timezone(&Utc);

    if expires_at - now > Duration::seconds(EXPIRY_MARGIN_SECS) {
        Some(AccessToken {
            token: token.to_string(),
            expires_at: Some(expires_at),
        })
    } else {
        None
    }
}

fn refresh_material(user: &AuthorizedUser) -> Result<(&str, &str, &str), SheetsError> {
    match (
        user.refresh_token.as_deref(),
        user.client_id.as_deref(),
        user.client_secret.as_deref(),
    ) {
        (Some(refresh), Some(id), Some(secret)) => Ok((refresh, id, secret)),
        _ => Err(SheetsError::configuration(
            "Stored token has expired and the token file has no refresh_token, client_id and client_secret",
        )),
    }
}

/// POST a grant to the token endpoint
async fn exchange(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
    now: DateTime<Utc>,
) -> Result<AccessToken, SheetsError> {
    let response = http
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| SheetsError::unavailable(format!("Token request failed: {}", e), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<OAuthErrorBody>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(SheetsError::rejected(
            format!("Token request rejected ({}): {}", status, detail),
            status.as_u16(),
        ));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SheetsError::unavailable(format!("Invalid token response: {}", e), e))?;

    debug!("Obtained access token from {}", token_uri);

    Ok(AccessToken {
        token: token.access_token,
        expires_at: token.expires_in.map(|secs| now + Duration::seconds(secs)),
    })
}
