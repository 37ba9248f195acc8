//! Errors from talking to the ranking backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend could not be reached at all
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Backend rejected the bearer token (or none was sent)
    #[error("not authorized ({status}); log in again")]
    Unauthorized { status: u16 },

    /// Any other non-success status
    #[error("backend error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Body did not have the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Map a reqwest send error, singling out connect/timeout failures.
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ApiError::Unreachable(e.to_string())
        } else {
            ApiError::Request(e)
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
