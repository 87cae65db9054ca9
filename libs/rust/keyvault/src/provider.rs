//! Secret provider trait and the secret types it returns.

use crate::error::KeyVaultResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::collections::HashMap;

/// Metadata about a retrieved secret
#[derive(Debug, Clone, Default)]
pub struct SecretMetadata {
    /// Full secret identifier URL, including version
    pub id: Option<String>,
    /// Version identifier resolved by the vault
    pub version: Option<String>,
    /// Content type set by the writer
    pub content_type: Option<String>,
    /// Whether the secret is enabled
    pub enabled: Option<bool>,
    /// Creation time
    pub created: Option<DateTime<Utc>>,
    /// Last update time
    pub updated: Option<DateTime<Utc>>,
    /// Expiry time
    pub expires: Option<DateTime<Utc>>,
    /// Not valid before
    pub not_before: Option<DateTime<Utc>>,
    /// Deletion recovery level
    pub recovery_level: Option<String>,
    /// Application tags
    pub tags: HashMap<String, String>,
    /// Backing key identifier for certificate-managed secrets
    pub key_id: Option<String>,
    /// Whether the secret lifetime is managed by Key Vault
    pub managed: bool,
}

/// A secret value with its metadata.
#[derive(Debug, Clone)]
pub struct KeyVaultSecret {
    /// Plaintext value
    pub value: SecretString,
    /// Metadata returned alongside the value
    pub metadata: SecretMetadata,
}

/// Point lookups of named secrets.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Get the latest version of a secret.
    async fn get_secret(&self, name: &str) -> KeyVaultResult<KeyVaultSecret>;

    /// Get a specific version of a secret. An empty version means latest.
    async fn get_secret_version(&self, name: &str, version: &str)
    -> KeyVaultResult<KeyVaultSecret>;
}
