//! Adapter error types and handling

use thiserror::Error;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors that can occur when talking to a model backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The configured backend string could not be resolved to an adapter.
    /// Only ever raised at startup.
    #[error("Cannot select a model adapter for '{config}': {reason}")]
    Selection { config: String, reason: String },

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Connection reset, timeout or any other failure while talking to upstream
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// The adapter is not usable as configured (e.g. no endpoint)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Streaming was requested from a blocking-only adapter
    #[error("Streaming is not supported by adapter '{0}'")]
    StreamingUnsupported(String),

    /// A successful response body could not be read as JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl AdapterError {
    /// Create a selection error
    pub fn selection(config: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::Selection {
            config: config.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened on the wire rather than in configuration
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AdapterError::UpstreamHttp { .. } | AdapterError::UpstreamTransport(_)
        )
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            AdapterError::Configuration(format!("Invalid upstream request: {}", err))
        } else if err.is_timeout() {
            AdapterError::UpstreamTransport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AdapterError::UpstreamTransport(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::UpstreamTransport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}
