//! Transport types
//!
//! Common types shared across transport implementations.

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Network error (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Invalid response from the engine
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error (missing credential, unresolvable model)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Streaming protocol error
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl EngineError {
    /// Whether this error means the service is misconfigured rather than
    /// the engine having failed at runtime
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Json(err.to_string())
    }
}

impl From<ureq::Error> for EngineError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(401, _) | ureq::Error::Status(403, _) => {
                EngineError::Authentication("API key rejected by the engine".to_string())
            }
            ureq::Error::Status(429, _) => {
                EngineError::RateLimited("engine refused the request".to_string())
            }
            ureq::Error::Status(code, response) => EngineError::Http {
                status: code,
                message: response.status_text().to_string(),
            },
            ureq::Error::Transport(err) => EngineError::Network(err.to_string()),
        }
    }
}

/// Synchronous HTTP transport
///
/// Abstraction over the HTTP client so adapters can be tested with
/// `FakeTransport`. Engine calls are blocking; callers dispatch them off
/// the async runtime with `spawn_blocking`.
pub trait SyncTransport: Send + Sync {
    /// POST JSON request and return the response body
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, EngineError>;

    /// POST JSON request and process the streaming response line-by-line
    ///
    /// Calls `on_line` for each line of the response body. When `on_line`
    /// returns `false` the consumer is gone and the transport stops reading.
    fn post_stream<F>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
        on_line: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> bool;
}
