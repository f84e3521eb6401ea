//! Error type shared by all providers.

/// Errors surfaced by external providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(reqwest::Error),
    /// The provider answered with an unexpected status code.
    #[error("unexpected status code {0}")]
    Status(u16),
    /// The provider answered with a body we cannot use.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The referenced resource no longer exists upstream.
    #[error("resource not found")]
    NotFound,
    /// Credentials are missing; the feature degrades instead of crashing.
    #[error("provider not configured")]
    Unconfigured,
    /// The request exceeded its time budget.
    #[error("request timed out")]
    Timeout,
}

impl ProviderError {
    /// Classifies a reqwest failure, keeping timeouts distinct.
    #[must_use]
    pub fn request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}
