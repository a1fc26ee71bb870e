//! HTTP surface of the proxy. The router lives in the lib so integration
//! tests can drive it with mocked transports.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ProxyError;
use crate::igdb::{clamp_limit, IgdbClient, LISTING_LIMIT_MAX, SEARCH_LIMIT_MAX};
use crate::localization::{EnrichedGame, Enricher};
use crate::ranking::rank_by_popularity;

#[derive(Clone)]
pub struct AppState {
    pub igdb: Arc<IgdbClient>,
    pub enricher: Arc<Enricher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", get(recent_games_handler))
        .route("/api/search", get(search_handler))
        .route("/api/collection/:id/games", get(collection_games_handler))
        .route("/api/franchise/:id/games", get(franchise_games_handler))
        .route("/api/wikidata-test", get(wikidata_test_handler))
        .with_state(state)
}

async fn recent_games_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.igdb.recent_games().await?))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    suggest: Option<String>,
    limit: Option<i64>,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EnrichedGame>>, AppError> {
    let q = params.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Err(AppError::bad_request("Missing query param: q"));
    }

    let suggest = params.suggest.as_deref() == Some("1");
    let limit = clamp_limit(params.limit.unwrap_or(20), SEARCH_LIMIT_MAX);

    let mut games = state.igdb.search_games(q, limit, suggest).await?;
    if suggest {
        games = rank_by_popularity(games, limit as usize);
    }

    let enriched = state.enricher.enrich(games).await;
    Ok(Json(enriched))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn collection_games_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, AppError> {
    let id: u64 = id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid collection id"))?;

    let limit = clamp_limit(params.limit.unwrap_or(50), LISTING_LIMIT_MAX);
    let offset = params.offset.unwrap_or(0).max(0);

    Ok(Json(state.igdb.collection_games(id, limit, offset).await?))
}

async fn franchise_games_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, AppError> {
    let id: u64 = id
        .parse()
        .map_err(|_| AppError::bad_request("Invalid franchise id"))?;

    let limit = clamp_limit(params.limit.unwrap_or(50), LISTING_LIMIT_MAX);
    let offset = params.offset.unwrap_or(0).max(0);

    Ok(Json(state.igdb.franchise_games(id, limit, offset).await?))
}

#[derive(Debug, Deserialize)]
struct WikidataTestParams {
    #[serde(rename = "nameEn")]
    name_en: Option<String>,
}

async fn wikidata_test_handler(
    State(state): State<AppState>,
    Query(params): Query<WikidataTestParams>,
) -> Result<Json<Value>, AppError> {
    let name_en = params.name_en.unwrap_or_default();
    let name_en = name_en.trim();
    if name_en.is_empty() {
        return Err(AppError::bad_request("Missing query param: nameEn"));
    }

    let name_fr = state.enricher.single_label(name_en).await?;
    Ok(Json(json!({
        "name_en": name_en,
        "name_fr": name_fr,
    })))
}

/// Error envelope: `{ error, details? }`. Upstream failures keep their own
/// status code; client input errors are 400 and never reach upstream.
pub struct AppError(ProxyError);

impl AppError {
    fn bad_request(msg: &str) -> Self {
        Self(ProxyError::InvalidInput(msg.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ProxyError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    details: None,
                },
            ),
            ProxyError::Upstream { status, details } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorBody {
                    error: "IGDB request failed".to_string(),
                    details: Some(details),
                },
            ),
            e => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "proxy error".to_string(),
                    details: Some(Value::String(e.to_string())),
                },
            ),
        };

        tracing::error!(status = %status, error = %body.error, "request failed");
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ProxyError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
