//! Classification of HTTP failures into retryable and permanent ones.

use reqwest::StatusCode;

/// Maximum number of attempts for a download.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Errors that should not be retried.
#[derive(Debug)]
pub enum NonRetryableError {
    /// Release asset does not exist (HTTP 404)
    NotFound(String),
    /// Authentication required or rejected (HTTP 401)
    AuthenticationFailed(String),
    /// Forbidden access (HTTP 403)
    Forbidden(String),
    /// Too many requests (HTTP 429)
    RateLimitExceeded(String),
    /// Other client errors that won't succeed on retry
    ClientError(String),
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(url) => {
                write!(
                    f,
                    "Not found: {}. The release may not exist for this version or platform.",
                    url
                )
            }
            NonRetryableError::AuthenticationFailed(url) => {
                write!(f, "Authentication failed: {}", url)
            }
            NonRetryableError::Forbidden(url) => {
                write!(f, "Access forbidden: {}", url)
            }
            NonRetryableError::RateLimitExceeded(url) => {
                write!(f, "Rate limit exceeded: {}. Try again later.", url)
            }
            NonRetryableError::ClientError(msg) => {
                write!(f, "Request error: {}", msg)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable, Err with a user-friendly message if not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "<unknown url>".to_string());

    if let Some(status) = error.status() {
        match status {
            StatusCode::NOT_FOUND => return Err(NonRetryableError::NotFound(url)),
            StatusCode::UNAUTHORIZED => return Err(NonRetryableError::AuthenticationFailed(url)),
            StatusCode::FORBIDDEN => return Err(NonRetryableError::Forbidden(url)),
            StatusCode::TOO_MANY_REQUESTS => return Err(NonRetryableError::RateLimitExceeded(url)),
            // Other 4xx client errors are generally not retryable
            s if s.is_client_error() => {
                return Err(NonRetryableError::ClientError(format!(
                    "HTTP {} from {}",
                    s.as_u16(),
                    url
                )));
            }
            // 5xx server errors are retryable
            _ => {}
        }
    }

    // Connection errors, timeouts, etc. are retryable
    Ok(())
}

/// Checks if an error from `error_for_status()` should be retried.
/// Returns the original error if retryable, or a user-friendly NonRetryableError if not.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
