use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered but refused the call; `message` is its own
    /// wording or the per-call fallback.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// An authenticated call was rejected with `401`.
    #[error("{0}")]
    Unauthorized(String),
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Failed to initialize HTTP client: {0}")]
    Client(String),
}

impl BackendError {
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// True when the caller should drop the session and sign in again.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
