//! Key Vault error types using thiserror 2.0.
//!
//! Each variant names the step of a fetch that failed. None of them are
//! retried internally; [`KeyVaultError::is_retryable`] only classifies.

use crate::source::SourceError;
use rust_common::PlatformError;
use thiserror::Error;

/// Key Vault errors.
#[derive(Error, Debug)]
pub enum KeyVaultError {
    /// A credential handle could not be resolved to a usable plaintext value
    #[error("Credential resolution failed: {0}")]
    CredentialResolution(String),

    /// No credential produced a token, or the vault rejected it
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Malformed vault endpoint or transport setup failure
    #[error("Client construction failed: {0}")]
    ClientConstruction(String),

    /// Secret absent from the vault
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// Vault answered with a non-success status other than 404
    #[error("Remote lookup failed with status {status} ({code}): {message}")]
    RemoteLookup {
        /// HTTP status code
        status: u16,
        /// Key Vault error code
        code: String,
        /// Key Vault error message
        message: String,
    },

    /// Invalid secret name or version
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Vault answered with a body that is not a secret bundle
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport timeout or other platform failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for Key Vault operations.
pub type KeyVaultResult<T> = Result<T, KeyVaultError>;

impl KeyVaultError {
    /// Check if error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::RemoteLookup { status, .. } => *status == 429 || *status >= 500,
            Self::Platform(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Create a credential resolution error.
    #[must_use]
    pub fn credential_resolution(msg: impl Into<String>) -> Self {
        Self::CredentialResolution(msg.into())
    }

    /// Create an authentication failed error.
    #[must_use]
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a client construction error.
    #[must_use]
    pub fn client_construction(msg: impl Into<String>) -> Self {
        Self::ClientConstruction(msg.into())
    }

    /// Create a secret not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::SecretNotFound(name.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<SourceError> for KeyVaultError {
    fn from(err: SourceError) -> Self {
        Self::CredentialResolution(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeyVaultError::not_found("test-secret1");
        assert_eq!(err.to_string(), "Secret not found: test-secret1");

        let err = KeyVaultError::RemoteLookup {
            status: 403,
            code: "Forbidden".to_string(),
            message: "caller lacks secrets/get".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote lookup failed with status 403 (Forbidden): caller lacks secrets/get"
        );
    }

    #[test]
    fn test_retryable_errors() {
        let throttled = KeyVaultError::RemoteLookup {
            status: 429,
            code: "Throttled".to_string(),
            message: String::new(),
        };
        assert!(throttled.is_retryable());
        let timed_out = KeyVaultError::Platform(PlatformError::Timeout("vault".to_string()));
        assert!(timed_out.is_retryable());
        assert!(!KeyVaultError::not_found("name").is_retryable());
        assert!(!KeyVaultError::auth_failed("bad secret").is_retryable());
        assert!(!KeyVaultError::credential_resolution("missing").is_retryable());
    }

    #[test]
    fn test_from_source_error() {
        let err: KeyVaultError = SourceError::InvalidHandle("nope".to_string()).into();
        assert!(matches!(err, KeyVaultError::CredentialResolution(_)));
    }

    #[test]
    fn test_from_platform_error() {
        let platform_err = PlatformError::invalid_input("KEYVAULT_HTTP_TIMEOUT_SECS");
        let err: KeyVaultError = platform_err.into();
        assert!(matches!(err, KeyVaultError::Platform(_)));
    }
}
