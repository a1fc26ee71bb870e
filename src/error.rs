use serde_json::Value;
use thiserror::Error;

/// Main error type for the proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream returned a non-2xx status; status and payload are passed
    /// through to the client as-is
    #[error("upstream error {status}")]
    Upstream { status: u16, details: Value },

    /// HTTP request errors (connect/read failures, not HTTP statuses)
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid caller input (maps to 400, no upstream call made)
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration errors (missing env vars at startup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl ProxyError {
    /// Build an Upstream error from a response that already failed its
    /// status check. Body is kept as JSON when it parses, raw text
    /// otherwise, so the client sees whatever the upstream said.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let details = serde_json::from_str(&text).unwrap_or(Value::String(text));
        ProxyError::Upstream { status, details }
    }
}

impl From<String> for ProxyError {
    fn from(s: String) -> Self {
        ProxyError::Other(s)
    }
}

impl From<&str> for ProxyError {
    fn from(s: &str) -> Self {
        ProxyError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ProxyError>;
