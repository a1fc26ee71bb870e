//! Wikidata SPARQL access: query builders, bindings parsing, and the
//! transport trait the enrichment pipeline runs against.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ProxyError, Result};

const USER_AGENT: &str = "LudexProxy/1.0 (contact: dev@ludex.app)";

/// Transport seam for the SPARQL endpoint.
#[async_trait]
pub trait SparqlClient: Send + Sync {
    /// Run a SELECT query and return the JSON results document.
    async fn select(&self, query: &str) -> Result<Value>;
}

/// reqwest-backed SPARQL GET client.
pub struct HttpSparqlClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSparqlClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.wikidata_url.clone(),
        })
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    async fn select(&self, query: &str) -> Result<Value> {
        let url = format!(
            "{}?format=json&query={}",
            self.endpoint,
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/sparql+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProxyError::from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

fn sparql_literal(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Batched lookup: French labels for video-game entities whose English
/// label or alt-label equals (case-insensitively) one of `names`.
pub fn batch_label_query(names: &[String]) -> String {
    let values = names
        .iter()
        .map(|n| sparql_literal(n))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?q ?frLabel WHERE {{
  VALUES ?q {{ {values} }}

  ?item wdt:P31 wd:Q7889.

  OPTIONAL {{ ?item rdfs:label ?enLabel FILTER(LANG(?enLabel) = "en") }}
  OPTIONAL {{ ?item skos:altLabel ?enAlt FILTER(LANG(?enAlt) = "en") }}

  FILTER(
    (BOUND(?enLabel) && LCASE(STR(?enLabel)) = LCASE(STR(?q))) ||
    (BOUND(?enAlt)  && LCASE(STR(?enAlt))  = LCASE(STR(?q)))
  )

  OPTIONAL {{ ?item rdfs:label ?frLabel FILTER(LANG(?frLabel) = "fr") }}
}}"#
    )
}

/// Single-title lookup by exact English label, for the debug endpoint.
pub fn single_label_query(name_en: &str) -> String {
    format!(
        r#"SELECT ?item ?frLabel WHERE {{
  ?item wdt:P31 wd:Q7889;
        rdfs:label {}@en.
  OPTIONAL {{ ?item rdfs:label ?frLabel FILTER(LANG(?frLabel) = "fr") }}
}}
LIMIT 1"#,
        sparql_literal(name_en)
    )
}

fn binding_str<'a>(binding: &'a Value, var: &str) -> Option<&'a str> {
    binding.get(var)?.get("value")?.as_str()
}

/// Extract `(requested name, French label)` pairs from a batch response.
/// Blank labels count as absent.
pub fn parse_label_bindings(json: &Value) -> Vec<(String, Option<String>)> {
    let bindings = json
        .pointer("/results/bindings")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    bindings
        .iter()
        .filter_map(|b| {
            let q = binding_str(b, "q")?.to_string();
            let fr = binding_str(b, "frLabel")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            Some((q, fr))
        })
        .collect()
}

/// First French label in a single-title response, when present and
/// non-blank.
pub fn parse_single_label(json: &Value) -> Option<String> {
    json.pointer("/results/bindings")
        .and_then(Value::as_array)
        .and_then(|bindings| bindings.first())
        .and_then(|b| binding_str(b, "frLabel"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_query_contains_escaped_values() {
        let names = vec!["Zelda".to_string(), "Baldur's \"Gate\"".to_string()];
        let query = batch_label_query(&names);

        assert!(query.contains(r#"VALUES ?q { "Zelda" "Baldur's \"Gate\"" }"#));
        assert!(query.contains("wdt:P31 wd:Q7889"));
        assert!(query.contains("LCASE"));
    }

    #[test]
    fn test_single_query_shape() {
        let query = single_label_query("Okami");
        assert!(query.contains(r#"rdfs:label "Okami"@en"#));
        assert!(query.contains("LIMIT 1"));
    }

    #[test]
    fn test_parse_label_bindings() {
        let json = json!({
            "results": {
                "bindings": [
                    {"q": {"value": "Zelda"}, "frLabel": {"value": "La Légende de Zelda"}},
                    {"q": {"value": "Okami"}, "frLabel": {"value": "  "}},
                    {"q": {"value": "Mario"}},
                ]
            }
        });

        let pairs = parse_label_bindings(&json);
        assert_eq!(
            pairs,
            vec![
                ("Zelda".to_string(), Some("La Légende de Zelda".to_string())),
                ("Okami".to_string(), None),
                ("Mario".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_parse_bindings_tolerates_malformed_document() {
        assert!(parse_label_bindings(&json!({"weird": true})).is_empty());
        assert_eq!(parse_single_label(&json!(null)), None);
    }

    #[test]
    fn test_parse_single_label() {
        let json = json!({
            "results": {"bindings": [{"frLabel": {"value": "Okami"}}]}
        });
        assert_eq!(parse_single_label(&json), Some("Okami".to_string()));
    }
}
