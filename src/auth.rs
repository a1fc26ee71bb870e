//! Twitch OAuth2 client-credentials cache. One credential slot for the
//! whole process; the slot mutex is held across the refresh await, so
//! concurrent callers hitting an expired token trigger a single refresh.

use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{ProxyError, Result};

/// A token is never handed out within this margin of its expiry.
const REFRESH_MARGIN_MS: i64 = 60_000;

#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at_ms: i64,
}

impl Credential {
    fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms - REFRESH_MARGIN_MS
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Process-wide credential cache for the identity provider.
pub struct TokenCache {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    slot: Mutex<Option<Credential>>,
}

impl TokenCache {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            slot: Mutex::new(None),
        })
    }

    /// Seed the slot with an already-known credential.
    pub async fn prime(&self, credential: Credential) {
        *self.slot.lock().await = Some(credential);
    }

    /// Return the cached token, refreshing it when absent or within 60 s of
    /// expiry. Upstream failure propagates untouched; there is no retry at
    /// this layer.
    pub async fn get_token(&self) -> Result<String> {
        let mut slot = self.slot.lock().await;
        let now_ms = Utc::now().timestamp_millis();

        if let Some(cred) = slot.as_ref() {
            if cred.is_fresh(now_ms) {
                return Ok(cred.token.clone());
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_response(response).await);
        }

        let data: TokenResponse = response.json().await?;
        let credential = Credential {
            token: data.access_token,
            expires_at_ms: now_ms + data.expires_in * 1000,
        };
        tracing::info!("obtained new access token from identity provider");

        let token = credential.token.clone();
        *slot = Some(credential);
        Ok(token)
    }
}
