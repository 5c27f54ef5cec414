//! Error taxonomy for the data access layer.
//!
//! Validation failures are rejected before any network call; network and
//! HTTP failures are classified here so the retry loop can tell transient
//! faults (timeouts, connectivity, 5xx) from terminal ones.

use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not complete within its deadline.
    #[error("Request timed out")]
    Timeout,

    /// The request never produced an HTTP response (DNS, refused
    /// connection, dropped socket). The browser-side analogue is status 0.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable detail, at most a short excerpt of the body.
        message: String,
    },

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected before any network I/O.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Classify a `reqwest` failure into the taxonomy.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Whether retrying the request could plausibly succeed.
    ///
    /// Timeouts, connectivity failures, and server-side (5xx) statuses are
    /// transient; everything else is terminal.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Parse(_) | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = ApiError::Validation("price must be positive".to_string());
        assert_eq!(err.to_string(), "Validation error: price must be positive");

        let err = ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Timeout.is_transient());
        assert!(ApiError::Network("connection refused".to_string()).is_transient());
        assert!(
            ApiError::Status {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ApiError::Status {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!ApiError::NotFound("x".to_string()).is_transient());
        assert!(!ApiError::Validation("x".to_string()).is_transient());
    }
}
