//! Centralized error types shared by the Key Vault crates.
//!
//! Every error is classified as retryable or not. Nothing in this workspace
//! retries on its own; the classification is exposed so callers can decide.

use thiserror::Error;

/// Common error type for platform plumbing.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP request or client construction failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tracing subscriber could not be installed
    #[error("Tracing initialisation failed: {0}")]
    Tracing(String),

    /// Request exceeded the configured timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::Timeout("token endpoint".to_string());
    /// assert!(err.is_retryable());
    ///
    /// let err = PlatformError::InvalidInput("vault name".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }

    /// Classify a failed request: timeouts become [`PlatformError::Timeout`],
    /// everything else stays [`PlatformError::Http`].
    #[must_use]
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let target = err
                .url()
                .map_or_else(|| "request".to_string(), |u| u.as_str().to_string());
            Self::Timeout(target)
        } else {
            Self::Http(err)
        }
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PlatformError::Timeout("test".to_string()).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!PlatformError::InvalidInput("test".to_string()).is_retryable());
        assert!(!PlatformError::Tracing("test".to_string()).is_retryable());
    }

    #[test]
    fn test_from_transport_keeps_non_timeouts_as_http() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        let err = PlatformError::from_transport(err);
        assert!(matches!(err, PlatformError::Http(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::Timeout("https://quickstart-kv.vault.azure.net/".to_string());
        assert_eq!(
            err.to_string(),
            "Operation timed out: https://quickstart-kv.vault.azure.net/"
        );

        let err = PlatformError::invalid_input("empty vault name");
        assert_eq!(err.to_string(), "Invalid input: empty vault name");
    }
}
