//! # Ludex Proxy
//!
//! API proxy for a game-cataloging frontend:
//! - Free-text query construction against the IGDB filter grammar
//!   (tokenization, synonym expansion, clause strategies)
//! - Cached Twitch client-credentials authentication
//! - Popularity reranking for type-ahead suggestions
//! - Batched, cached, deadline-bounded French display-name enrichment
//!   via Wikidata
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ludex_proxy::{Config, Enricher, HttpIgdbTransport, HttpSparqlClient, IgdbClient, TokenCache};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let tokens = Arc::new(TokenCache::new(&config)?);
//!     let igdb = IgdbClient::new(Arc::new(HttpIgdbTransport::new(&config, tokens)?));
//!
//!     let results = igdb.search_games("pokemon emeraude", 10, true).await?;
//!     println!("{} results", results.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod igdb;
pub mod localization;
pub mod query;
pub mod ranking;

#[cfg(feature = "server")]
pub mod server;

// Re-export primary types
pub use auth::{Credential, TokenCache};
pub use config::Config;
pub use error::{ProxyError, Result};
pub use igdb::{HttpIgdbTransport, IgdbClient, IgdbTransport};
pub use localization::{EnrichedGame, Enricher, HttpSparqlClient, LabelCache, SparqlClient};
pub use ranking::rank_by_popularity;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
