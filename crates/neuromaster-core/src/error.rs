//! Error types shared across the neuromaster crates.
//!
//! `ProviderError` lives here rather than in `neuromaster-providers` so the
//! session layer can classify content failures without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when asking a content provider for a round.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response parsed but carried no usable text or image.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// No generative backend is configured.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::ModelNotFound(_)
                | ProviderError::Unavailable(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Lookup failures against the nerve catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no cranial nerve with id {0} (expected 1-12)")]
    NotFound(u8),
}

/// Persistence failures of the stats store.
///
/// Only `save` can produce these; loads always degrade to an empty record.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
