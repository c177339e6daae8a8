use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The service signalled throttling (HTTP 429). Retry later.
    #[error("extraction service is rate limiting requests")]
    RateLimited,

    /// The bounded request timeout elapsed.
    #[error("extraction request timed out")]
    Timeout,

    /// Non-2xx, non-429 response from the service.
    #[error("extraction service returned HTTP {0}")]
    Service(u16),

    /// The response body did not match the wire contract.
    #[error("malformed extraction response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Transport-level failure (connect, TLS, etc).
    #[error("extraction transport error: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractError::Timeout
        } else {
            ExtractError::Http(err)
        }
    }
}
