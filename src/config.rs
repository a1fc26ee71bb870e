use crate::error::{ProxyError, Result};

pub const DEFAULT_IGDB_BASE_URL: &str = "https://api.igdb.com/v4";
pub const DEFAULT_WIKIDATA_URL: &str = "https://query.wikidata.org/sparql";
pub const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
pub const DEFAULT_PORT: u16 = 3001;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Twitch application client id (also sent as the IGDB Client-ID header)
    pub client_id: String,
    /// Twitch application client secret
    pub client_secret: String,
    /// OAuth2 client-credentials token endpoint
    pub token_url: String,
    /// IGDB API base URL
    pub igdb_base_url: String,
    /// Wikidata SPARQL endpoint
    pub wikidata_url: String,
    /// HTTP listen port
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment. The Twitch credentials are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let client_id = require_env("TWITCH_CLIENT_ID")?;
        let client_secret = require_env("TWITCH_CLIENT_SECRET")?;

        let igdb_base_url = std::env::var("IGDB_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_IGDB_BASE_URL.to_string());
        let wikidata_url = std::env::var("WIKIDATA_URL")
            .unwrap_or_else(|_| DEFAULT_WIKIDATA_URL.to_string());
        let token_url = std::env::var("TWITCH_TOKEN_URL")
            .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            client_id,
            client_secret,
            token_url,
            igdb_base_url,
            wikidata_url,
            port,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProxyError::Config(format!("{} is not set", name))),
    }
}
