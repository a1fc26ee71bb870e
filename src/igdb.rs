//! IGDB query executor. Requests go through [`IgdbTransport`] so tests can
//! substitute a recording mock; the HTTP implementation authenticates via
//! the shared [`TokenCache`] and passes upstream failures through untouched.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenCache;
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::query::{build_title_where, escape_igdb_string, normalize_query};

pub const SEARCH_LIMIT_MAX: i64 = 50;
pub const LISTING_LIMIT_MAX: i64 = 200;

/// Projection for the search path: everything the frontend cards need plus
/// localized/alternate names and franchise/collection refs.
const SEARCH_FIELDS: &str = "fields name,cover.url,first_release_date,summary,platforms.name,\
total_rating,total_rating_count,alternative_names.name,\
game_localizations.name,game_localizations.region.name,\
franchises.id,franchises.name,collections.id,collections.name;";

const RECENT_FIELDS: &str =
    "fields name, cover.url, first_release_date, summary, platforms.name;";

const COLLECTION_FIELDS: &str = "fields name,cover.url,first_release_date,summary,\
platforms.name,total_rating,total_rating_count,collections.id,collections.name;";

const FRANCHISE_FIELDS: &str = "fields name,cover.url,first_release_date,summary,\
platforms.name,total_rating,total_rating_count,franchises.id,franchises.name;";

/// Transport seam for the metadata provider.
#[async_trait]
pub trait IgdbTransport: Send + Sync {
    /// POST a text query to an IGDB endpoint and return the parsed body.
    async fn query(&self, endpoint: &str, body: &str) -> Result<Value>;
}

/// reqwest-backed transport with Twitch authentication headers.
pub struct HttpIgdbTransport {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    tokens: Arc<TokenCache>,
}

impl HttpIgdbTransport {
    pub fn new(config: &Config, tokens: Arc<TokenCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.igdb_base_url.clone(),
            client_id: config.client_id.clone(),
            tokens,
        })
    }
}

#[async_trait]
impl IgdbTransport for HttpIgdbTransport {
    async fn query(&self, endpoint: &str, body: &str) -> Result<Value> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .header("Client-ID", &self.client_id)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Clamp a caller-supplied limit into `[1, max]`. Out-of-range values are
/// clamped, not rejected.
pub fn clamp_limit(limit: i64, max: i64) -> i64 {
    limit.clamp(1, max)
}

fn as_array(data: Value) -> Vec<Value> {
    match data {
        Value::Array(arr) => arr,
        _ => Vec::new(),
    }
}

fn search_body(q: &str, fetch_limit: i64) -> String {
    format!(
        "{} search \"{}\"; limit {};",
        SEARCH_FIELDS,
        escape_igdb_string(q),
        fetch_limit
    )
}

/// Game queries against the metadata provider.
pub struct IgdbClient {
    transport: Arc<dyn IgdbTransport>,
}

impl IgdbClient {
    pub fn new(transport: Arc<dyn IgdbTransport>) -> Self {
        Self { transport }
    }

    async fn games(&self, body: &str) -> Result<Value> {
        self.transport.query("games", body).await
    }

    /// Fixed top-10 recently released games. Pass-through, no coercion.
    pub async fn recent_games(&self) -> Result<Value> {
        let body = format!(
            "{} sort first_release_date desc; limit 10;",
            RECENT_FIELDS
        );
        self.games(&body).await
    }

    /// Provider-native substring search. Suggest mode over-fetches up to
    /// 5x the limit (capped at 50) so the caller can rerank by popularity.
    /// An empty result set triggers one retry with the diacritic-stripped
    /// query; IGDB matching is accent-sensitive.
    pub async fn search_games(
        &self,
        raw_query: &str,
        limit: i64,
        suggest: bool,
    ) -> Result<Vec<Value>> {
        let q = raw_query.trim();
        if q.is_empty() {
            return Err(ProxyError::InvalidInput("Missing query param: q".to_string()));
        }

        let limit = clamp_limit(limit, SEARCH_LIMIT_MAX);
        let fetch_limit = if suggest {
            (limit * 5).min(SEARCH_LIMIT_MAX)
        } else {
            limit
        };

        let data = self.games(&search_body(q, fetch_limit)).await?;
        let arr = as_array(data);
        if !arr.is_empty() {
            return Ok(arr);
        }

        let stripped = normalize_query(q);
        tracing::debug!(query = q, retry = %stripped, "empty result, retrying without accents");
        let retry = self.games(&search_body(&stripped, fetch_limit)).await?;
        Ok(as_array(retry))
    }

    /// Token-filter search: the clause-builder strategy instead of the
    /// provider's native relevance search. Errors when the query reduces to
    /// nothing but stopwords.
    pub async fn search_games_filtered(&self, raw_query: &str, limit: i64) -> Result<Vec<Value>> {
        let clause = build_title_where("name", raw_query).ok_or_else(|| {
            ProxyError::InvalidInput("query has no usable tokens".to_string())
        })?;

        let limit = clamp_limit(limit, SEARCH_LIMIT_MAX);
        let body = format!(
            "{} where {}; sort total_rating_count desc; limit {};",
            SEARCH_FIELDS, clause, limit
        );

        Ok(as_array(self.games(&body).await?))
    }

    /// Games in a collection, most popular first.
    pub async fn collection_games(&self, id: u64, limit: i64, offset: i64) -> Result<Vec<Value>> {
        let limit = clamp_limit(limit, LISTING_LIMIT_MAX);
        let offset = offset.max(0);

        let body = format!(
            "{} where collections = ({}); sort total_rating_count desc; limit {}; offset {};",
            COLLECTION_FIELDS, id, limit, offset
        );

        Ok(as_array(self.games(&body).await?))
    }

    /// Games in a franchise, most popular first.
    pub async fn franchise_games(&self, id: u64, limit: i64, offset: i64) -> Result<Vec<Value>> {
        let limit = clamp_limit(limit, LISTING_LIMIT_MAX);
        let offset = offset.max(0);

        let body = format!(
            "{} where franchises = ({}); sort total_rating_count desc; limit {}; offset {};",
            FRANCHISE_FIELDS, id, limit, offset
        );

        Ok(as_array(self.games(&body).await?))
    }
}
