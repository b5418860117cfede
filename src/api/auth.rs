//! Client-credentials authentication against the Spotify accounts service.
//!
//! The access token is fetched on first use and cached until shortly before
//! it expires.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::SpotifyConfig;
use crate::error::{DashboardError, Result};

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// A bearer token and the moment it stops being usable.
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN < self.expires_at
    }
}

/// Fetches and caches client-credentials access tokens.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenProvider {
    /// Create a provider for the given configuration. No request is made yet.
    pub fn new(client: Client, config: &SpotifyConfig) -> Self {
        Self {
            client,
            token_url: format!("{}api/token", config.accounts_url),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Return a usable bearer token, requesting a new one if needed.
    pub async fn bearer(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn request_token(&self) -> Result<AccessToken> {
        debug!("POST {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            error!("Token request rejected ({}): {}", status, body);
            return Err(DashboardError::BadCredentials(describe_token_error(&body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token request failed ({}): {}", status, body);
            return Err(DashboardError::ApiError {
                status: status.as_u16(),
                message: describe_token_error(&body),
            });
        }

        let token: TokenResponse = response.json().await?;
        info!("Obtained access token valid for {}s", token.expires_in);

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

/// Pull a readable message out of an accounts-service error body.
fn describe_token_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error_description")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "token request rejected".to_string())
}
