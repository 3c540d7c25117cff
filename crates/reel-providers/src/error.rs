//! Provider error types.

use std::time::Duration;

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Candidate rejected: {0}")]
    ConstraintViolation(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub fn search_failed(msg: impl Into<String>) -> Self {
        Self::SearchFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::ConstraintViolation(msg.into())
    }

    /// Whether retrying the same call could plausibly succeed.
    ///
    /// Constraint violations and missing credentials are never retried:
    /// the former move on to the next candidate, the latter skip the tier.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::SearchFailed(_)
                | ProviderError::DownloadFailed(_)
                | ProviderError::GenerationFailed(_)
                | ProviderError::Timeout(_)
                | ProviderError::Http(_)
                | ProviderError::Io(_)
        )
    }

    /// Whether this error means the tier is unconfigured rather than broken.
    pub fn is_tier_skip(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey(_))
    }
}
