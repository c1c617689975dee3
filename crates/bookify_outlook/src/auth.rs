// File: crates/bookify_outlook/src/auth.rs
//! Client-credentials authentication against Microsoft Entra ID.
//!
//! Tokens are cached until shortly before expiry and refreshed on demand, so
//! a burst of availability queries costs one token round trip.

use crate::service::OutlookServiceError;
use bookify_config::OutlookConfig;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Refresh this long before the provider-reported expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub(crate) access_token: String,
    pub(crate) expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Bearer-token provider for the Graph API.
///
/// Constructed once at process start and shared by reference; there is no
/// ambient global token state.
pub struct GraphTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl GraphTokenProvider {
    pub fn new(client: Client, config: &OutlookConfig) -> Self {
        let client_secret = config.client_secret.clone().unwrap_or_else(|| {
            warn!("Outlook client secret is not configured; Graph calls will fail until it is set");
            String::new()
        });
        Self {
            client,
            token_url: format!(
                "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
                config.tenant_id
            ),
            client_id: config.client_id.clone(),
            client_secret,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, exchanging client credentials when the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, OutlookServiceError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting Graph access token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_DEFAULT_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutlookServiceError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| OutlookServiceError::Auth(format!("malformed token response: {err}")))?;

        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        });
        Ok(access_token)
    }
}
