//! OAuth credentials for the Questrade API.
//!
//! Questrade issues short-lived access tokens through a refresh-token
//! exchange. The credentials file keeps the latest access token, the API
//! server it is valid for, and the single-use refresh token that comes with
//! it. The file is rewritten after every exchange.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::types::TokenResponse;
use crate::error::BrokerError;

/// Default Questrade OAuth token endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://login.questrade.com/oauth2/token";

/// Persisted session credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub token_type: String,
    pub access_token: String,
    pub api_server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access-token lifetime in seconds; 0 when unknown.
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn from_token_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            token_type: resp.token_type.clone(),
            access_token: resp.access_token.clone(),
            api_server: resp.api_server.clone(),
            refresh_token: Some(resp.refresh_token.clone()),
            expires_in: resp.expires_in,
            obtained_at: Some(now),
        }
    }

    /// Read credentials from a JSON file.
    ///
    /// A missing or unparsable file is an [`BrokerError::Auth`] error.
    pub fn load(path: &Path) -> Result<Self, BrokerError> {
        let content = fs::read_to_string(path).map_err(|e| {
            BrokerError::Auth(format!(
                "cannot read credentials file {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            BrokerError::Auth(format!(
                "invalid credentials file {}: {e}",
                path.display()
            ))
        })
    }

    /// Write credentials as pretty JSON with a trailing newline.
    pub fn save(&self, path: &Path) -> Result<(), BrokerError> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| BrokerError::Other(format!("failed to encode credentials: {e}")))?;
        json.push('\n');
        fs::write(path, json).map_err(|e| {
            BrokerError::Other(format!(
                "cannot write credentials file {}: {e}",
                path.display()
            ))
        })?;
        debug!("Wrote credentials to {}", path.display());
        Ok(())
    }

    /// Whether the access token has expired at `now`.
    ///
    /// Credentials without an expiry record never report expiry; the API
    /// answers 401 if they are stale. An expiry outside the representable
    /// date range is an [`BrokerError::Auth`] error.
    pub fn is_expired(&self, now: DateTime<Utc>) -> Result<bool, BrokerError> {
        match self.obtained_at {
            Some(obtained) if self.expires_in > 0 => {
                let expires_at = Duration::try_seconds(self.expires_in)
                    .and_then(|lifetime| obtained.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        BrokerError::Auth("invalid expiry in credentials file".into())
                    })?;
                Ok(now >= expires_at)
            }
            _ => Ok(false),
        }
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// API base URL, always ending in `/`.
    pub fn base_url(&self) -> String {
        if self.api_server.ends_with('/') {
            self.api_server.clone()
        } else {
            format!("{}/", self.api_server)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("api_server", &self.api_server)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.access_token.zeroize();
        if let Some(token) = self.refresh_token.as_mut() {
            token.zeroize();
        }
    }
}

impl Drop for TokenResponse {
    fn drop(&mut self) {
        self.access_token.zeroize();
        self.refresh_token.zeroize();
    }
}

/// Exchange a refresh token for new credentials
/// (GET `{oauth_url}?grant_type=refresh_token&refresh_token=...`).
pub fn refresh(
    client: &Client,
    oauth_url: &str,
    refresh_token: &str,
) -> Result<Credentials, BrokerError> {
    info!("Refreshing Questrade access token");

    let resp = client
        .get(oauth_url)
        .query(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .map_err(|e| BrokerError::Auth(format!("token request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        return Err(BrokerError::Auth(format!(
            "token exchange returned {status}: {body}"
        )));
    }

    let token = resp
        .json::<TokenResponse>()
        .map_err(|e| BrokerError::Auth(format!("failed to parse token response: {e}")))?;

    Ok(Credentials::from_token_response(token, Utc::now()))
}
