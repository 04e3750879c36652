//! Error classification for page fetches.
//!
//! A missing listing page is an expected outcome and must be tellable apart
//! from every other HTTP failure, so status errors are wrapped in a typed
//! error the caller can downcast.

use reqwest::StatusCode;

/// Fetch failures that carry meaning for the caller.
#[derive(Debug)]
pub enum FetchError {
    /// The page does not exist (HTTP 404).
    NotFound(String),
    /// Any other non-success HTTP status.
    Status(u16, String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotFound(url) => write!(f, "Not found: {}", url),
            FetchError::Status(code, url) => write!(f, "HTTP {} error fetching {}", code, url),
        }
    }
}

impl std::error::Error for FetchError {}

/// Wraps a status error from `error_for_status()` into a typed [`FetchError`].
/// Errors without a status (connection failures, timeouts) pass through.
pub fn classify_status(error: reqwest::Error) -> anyhow::Error {
    let url = error.url().map(|url| url.to_string()).unwrap_or_default();
    match error.status() {
        Some(StatusCode::NOT_FOUND) => anyhow::Error::from(FetchError::NotFound(url)),
        Some(status) => anyhow::Error::from(FetchError::Status(status.as_u16(), url)),
        None => anyhow::Error::from(error),
    }
}

/// True when the error is an HTTP 404.
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<FetchError>(),
        Some(FetchError::NotFound(_))
    )
}
