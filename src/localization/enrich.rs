//! Enrichment pipeline: attach localized display names to a result batch.
//!
//! Enrichment is a non-critical value-add. Any upstream slowness or failure
//! degrades to canonical names; it never fails the search response.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProxyError, Result};
use crate::localization::cache::LabelCache;
use crate::localization::wikidata::{batch_label_query, parse_label_bindings, parse_single_label, single_label_query, SparqlClient};

/// Overall deadline for one enrichment call, across all miss batches.
/// Generous on purpose: normal batch sizes finish well under it, and a
/// false timeout costs every localized name in the response.
pub const ENRICH_TIMEOUT: Duration = Duration::from_millis(2000);

/// Cache misses per SPARQL request, bounding upstream query size.
const BATCH_SIZE: usize = 15;

/// A provider record plus localization fields. The raw record is flattened
/// back into the JSON response unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedGame {
    #[serde(flatten)]
    pub game: Map<String, Value>,
    /// Localized label when known and non-blank, else the canonical name.
    pub display_name: String,
    pub name_fr: Option<String>,
    /// Canonical name exactly as received from the provider.
    pub name_en: String,
}

pub struct Enricher {
    cache: LabelCache,
    sparql: Arc<dyn SparqlClient>,
    timeout: Duration,
}

impl Enricher {
    pub fn new(sparql: Arc<dyn SparqlClient>) -> Self {
        Self {
            cache: LabelCache::new(),
            sparql,
            timeout: ENRICH_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(sparql: Arc<dyn SparqlClient>, timeout: Duration) -> Self {
        Self {
            cache: LabelCache::new(),
            sparql,
            timeout,
        }
    }

    /// Resolve and merge localized labels for a result batch. On timeout or
    /// any resolution error, every record falls back to its canonical name.
    pub async fn enrich(&self, games: Vec<Value>) -> Vec<EnrichedGame> {
        if games.is_empty() {
            return Vec::new();
        }

        let names: Vec<String> = games
            .iter()
            .filter_map(|g| g.get("name").and_then(Value::as_str))
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();

        let labels = match tokio::time::timeout(self.timeout, self.resolve_labels(&names)).await {
            Ok(Ok(map)) => map,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "label resolution failed, serving canonical names");
                HashMap::new()
            }
            Err(_) => {
                tracing::warn!("label resolution timed out, serving canonical names");
                HashMap::new()
            }
        };

        games
            .into_iter()
            .map(|g| {
                let name_en = g
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                let name_fr = labels.get(name_en.trim()).cloned().flatten();
                let game = match g {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                EnrichedGame {
                    display_name: name_fr.clone().unwrap_or_else(|| name_en.clone()),
                    name_fr,
                    name_en,
                    game,
                }
            })
            .collect()
    }

    /// Map trimmed unique names to their localized label (or a negative).
    /// Cache hits skip the network entirely; misses go out in batches.
    /// A non-2xx on one batch negative-caches that whole batch and moves
    /// on; transport-level errors abort resolution.
    async fn resolve_labels(&self, names: &[String]) -> Result<HashMap<String, Option<String>>> {
        let mut result: HashMap<String, Option<String>> = HashMap::new();
        let mut to_fetch: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                continue;
            }
            match self.cache.get(trimmed) {
                Some(value) => {
                    result.insert(trimmed.to_string(), value);
                }
                None => to_fetch.push(trimmed.to_string()),
            }
        }

        if to_fetch.is_empty() {
            return Ok(result);
        }

        for chunk in to_fetch.chunks(BATCH_SIZE) {
            let query = batch_label_query(chunk);
            let response = match self.sparql.select(&query).await {
                Ok(json) => json,
                Err(ProxyError::Upstream { status, .. }) => {
                    tracing::warn!(status, "batch label lookup failed, caching negatives");
                    for name in chunk {
                        result.insert(name.clone(), None);
                        self.cache.insert(name, None);
                    }
                    continue;
                }
                Err(e) => return Err(e),
            };

            for name in chunk {
                result.insert(name.clone(), None);
            }
            for (name, label) in parse_label_bindings(&response) {
                result.insert(name, label);
            }
            for name in chunk {
                self.cache.insert(name, result.get(name).cloned().flatten());
            }
        }

        Ok(result)
    }

    /// Single-title lookup for the debug endpoint. Upstream non-2xx reads
    /// as "no label"; transport errors propagate.
    pub async fn single_label(&self, name_en: &str) -> Result<Option<String>> {
        match self.sparql.select(&single_label_query(name_en)).await {
            Ok(json) => Ok(parse_single_label(&json)),
            Err(ProxyError::Upstream { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedSparql {
        response: Value,
        calls: AtomicUsize,
    }

    impl CannedSparql {
        fn new(response: Value) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SparqlClient for CannedSparql {
        async fn select(&self, _query: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct FailingSparql {
        error_status: Option<u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SparqlClient for FailingSparql {
        async fn select(&self, _query: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.error_status {
                Some(status) => Err(ProxyError::Upstream {
                    status,
                    details: Value::Null,
                }),
                None => Err(ProxyError::Other("connection reset".to_string())),
            }
        }
    }

    struct SlowSparql;

    #[async_trait]
    impl SparqlClient for SlowSparql {
        async fn select(&self, _query: &str) -> Result<Value> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(json!({"results": {"bindings": []}}))
        }
    }

    fn games(names: &[&str]) -> Vec<Value> {
        names.iter().map(|n| json!({"name": n, "id": 1})).collect()
    }

    fn bindings_response(pairs: &[(&str, &str)]) -> Value {
        let bindings: Vec<Value> = pairs
            .iter()
            .map(|(q, fr)| json!({"q": {"value": q}, "frLabel": {"value": fr}}))
            .collect();
        json!({"results": {"bindings": bindings}})
    }

    #[tokio::test]
    async fn test_labels_merged_into_results() {
        let sparql = Arc::new(CannedSparql::new(bindings_response(&[(
            "The Legend of Zelda",
            "La Légende de Zelda",
        )])));
        let enricher = Enricher::new(sparql);

        let out = enricher
            .enrich(games(&["The Legend of Zelda", "Mario"]))
            .await;

        assert_eq!(out[0].display_name, "La Légende de Zelda");
        assert_eq!(out[0].name_fr.as_deref(), Some("La Légende de Zelda"));
        assert_eq!(out[0].name_en, "The Legend of Zelda");
        // no binding -> canonical fallback, negative cached
        assert_eq!(out[1].display_name, "Mario");
        assert_eq!(out[1].name_fr, None);
    }

    #[tokio::test]
    async fn test_total_failure_falls_back_to_canonical() {
        let sparql = Arc::new(FailingSparql {
            error_status: None,
            calls: AtomicUsize::new(0),
        });
        let enricher = Enricher::new(sparql);

        let out = enricher.enrich(games(&["Zelda", "Mario"])).await;
        assert_eq!(out.len(), 2);
        for g in &out {
            assert_eq!(g.display_name, g.name_en);
            assert_eq!(g.name_fr, None);
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_canonical() {
        let enricher = Enricher::with_timeout(Arc::new(SlowSparql), Duration::from_millis(20));

        let out = enricher.enrich(games(&["Zelda"])).await;
        assert_eq!(out[0].display_name, "Zelda");
        assert_eq!(out[0].name_fr, None);
    }

    #[tokio::test]
    async fn test_cache_hits_skip_network() {
        let sparql = Arc::new(CannedSparql::new(bindings_response(&[("Zelda", "fr")])));
        let enricher = Enricher::new(sparql.clone());

        enricher.enrich(games(&["Zelda"])).await;
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 1);

        let out = enricher.enrich(games(&["Zelda"])).await;
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 1);
        assert_eq!(out[0].display_name, "fr");
    }

    #[tokio::test]
    async fn test_upstream_error_negative_cached() {
        let sparql = Arc::new(FailingSparql {
            error_status: Some(503),
            calls: AtomicUsize::new(0),
        });
        let enricher = Enricher::new(sparql.clone());

        let out = enricher.enrich(games(&["Zelda"])).await;
        assert_eq!(out[0].name_fr, None);
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 1);

        // negative entry serves the retry within the TTL window
        enricher.enrich(games(&["Zelda"])).await;
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_batched_in_groups() {
        let sparql = Arc::new(CannedSparql::new(json!({"results": {"bindings": []}})));
        let enricher = Enricher::new(sparql.clone());

        let names: Vec<String> = (0..20).map(|i| format!("Game {}", i)).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        enricher.enrich(games(&name_refs)).await;

        // 20 unique misses, 15 per batch
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_names_deduplicated() {
        let sparql = Arc::new(CannedSparql::new(json!({"results": {"bindings": []}})));
        let enricher = Enricher::new(sparql.clone());

        enricher.enrich(games(&["Zelda", "Zelda", "Zelda"])).await;
        assert_eq!(sparql.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_label_upstream_error_reads_as_none() {
        let sparql = Arc::new(FailingSparql {
            error_status: Some(429),
            calls: AtomicUsize::new(0),
        });
        let enricher = Enricher::new(sparql);
        assert_eq!(enricher.single_label("Zelda").await.unwrap(), None);
    }

    #[test]
    fn test_enriched_game_serializes_flat() {
        let enriched = EnrichedGame {
            game: json!({"id": 7, "name": "Zelda"})
                .as_object()
                .unwrap()
                .clone(),
            display_name: "La Légende".to_string(),
            name_fr: Some("La Légende".to_string()),
            name_en: "Zelda".to_string(),
        };

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["name"], "Zelda");
        assert_eq!(value["display_name"], "La Légende");
        assert_eq!(value["name_fr"], "La Légende");
    }
}
