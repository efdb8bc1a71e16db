//! Embedding backend error types.

use thiserror::Error;

/// Errors that can occur when producing embeddings.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A local model failed to load.
    #[error("model load failed: {0}")]
    ModelLoad(String),

    /// A local model failed while producing vectors.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl EmbedError {
    /// Whether a retry with the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbedError::RateLimited { .. }
            | EmbedError::Timeout(_)
            | EmbedError::NetworkError(_) => true,
            EmbedError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
