//! Localized display-name enrichment: a TTL label cache in front of
//! batched Wikidata SPARQL lookups, merged into search results under an
//! overall deadline.

pub mod cache;
pub mod enrich;
pub mod wikidata;

pub use cache::LabelCache;
pub use enrich::{EnrichedGame, Enricher};
pub use wikidata::{HttpSparqlClient, SparqlClient};
