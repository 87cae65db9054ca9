//! Mock implementations for testing.

use async_trait::async_trait;
use keyvault_client::{SecretHandle, SecretSource, SourceError};
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory secret source.
///
/// Unknown handles fail to resolve. Every call is recorded, successful or
/// not, so tests can assert what was asked for.
#[derive(Debug, Clone, Default)]
pub struct MockSecretSource {
    values: Arc<RwLock<HashMap<SecretHandle, String>>>,
    calls: Arc<RwLock<Vec<SecretHandle>>>,
}

impl MockSecretSource {
    /// Create an empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source pre-populated with handle/value pairs.
    #[must_use]
    pub fn with_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (SecretHandle, V)>,
        V: Into<String>,
    {
        let map = values.into_iter().map(|(h, v)| (h, v.into())).collect();
        Self {
            values: Arc::new(RwLock::new(map)),
            calls: Arc::default(),
        }
    }

    /// Store a value for a handle.
    pub async fn insert(&self, handle: SecretHandle, value: impl Into<String>) {
        self.values.write().await.insert(handle, value.into());
    }

    /// Remove a handle so it fails to resolve.
    pub async fn remove(&self, handle: &SecretHandle) {
        self.values.write().await.remove(handle);
    }

    /// Handles requested so far, in order.
    pub async fn calls(&self) -> Vec<SecretHandle> {
        self.calls.read().await.clone()
    }

    /// Number of resolution attempts.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl SecretSource for MockSecretSource {
    async fn resolve_plaintext(&self, handle: &SecretHandle) -> Result<SecretString, SourceError> {
        self.calls.write().await.push(handle.clone());
        self.values
            .read()
            .await
            .get(handle)
            .map(|v| SecretString::from(v.clone()))
            .ok_or_else(|| SourceError::Other(format!("no mock value for {handle}")))
    }
}
