use minutes_core::BoardError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session expired or missing")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// The extraction service (or the API on its behalf) is throttling.
    #[error("rate limited; try again shortly")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    /// Any other API error, with the server's code and message.
    #[error("api error {status}: {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Http(reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Board(#[from] BoardError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(err)
        }
    }
}
