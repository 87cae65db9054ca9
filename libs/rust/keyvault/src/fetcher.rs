//! One-shot secret fetch: resolve credentials, authenticate, look up.

use crate::{
    client::SecretClient,
    config::{KeyVaultConfig, VaultEndpoint, validate_secret_name},
    credential::{CredentialBundle, default_credential_chain},
    error::{KeyVaultError, KeyVaultResult},
    provider::SecretProvider,
    source::{SecretHandle, SecretSource},
};
use rust_common::build_http_client;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, instrument};

/// Vault and secret to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRequest {
    /// Vault name, expanded with the configured URL template
    pub vault_name: String,
    /// Secret name; the latest version is returned
    pub secret_name: String,
}

impl SecretRequest {
    /// Create a request.
    #[must_use]
    pub fn new(vault_name: impl Into<String>, secret_name: impl Into<String>) -> Self {
        Self {
            vault_name: vault_name.into(),
            secret_name: secret_name.into(),
        }
    }
}

/// Handles for the three service-principal credential components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialHandles {
    /// Tenant id handle
    pub tenant_id: SecretHandle,
    /// Client id handle
    pub client_id: SecretHandle,
    /// Client secret handle
    pub client_secret: SecretHandle,
}

impl CredentialHandles {
    /// The conventional `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
    /// `AZURE_CLIENT_SECRET` environment handles.
    #[must_use]
    pub fn from_azure_env() -> Self {
        Self {
            tenant_id: SecretHandle::env("AZURE_TENANT_ID"),
            client_id: SecretHandle::env("AZURE_CLIENT_ID"),
            client_secret: SecretHandle::env("AZURE_CLIENT_SECRET"),
        }
    }
}

/// Fetches single secrets using credentials resolved through `S`.
///
/// Each call builds its own transport and credential chain, so calls with
/// different credentials can run concurrently without interfering.
#[derive(Debug, Clone)]
pub struct SecretFetcher<S> {
    source: S,
    config: KeyVaultConfig,
}

impl<S: SecretSource> SecretFetcher<S> {
    /// Create a fetcher.
    pub const fn new(source: S, config: KeyVaultConfig) -> Self {
        Self { source, config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &KeyVaultConfig {
        &self.config
    }

    /// Fetch the latest value of `secret_name` from `vault_name`.
    ///
    /// All three credential handles are resolved before any request is
    /// sent; the first failing step is returned as the error.
    ///
    /// # Errors
    ///
    /// - [`KeyVaultError::ClientConstruction`] for an invalid vault name,
    ///   endpoint or transport
    /// - [`KeyVaultError::InvalidInput`] for an invalid secret name
    /// - [`KeyVaultError::CredentialResolution`] if a handle fails to resolve
    /// - [`KeyVaultError::Authentication`] if no token could be obtained
    /// - [`KeyVaultError::SecretNotFound`] if the secret does not exist
    /// - [`KeyVaultError::RemoteLookup`] for any other vault failure
    #[instrument(skip_all, fields(vault = %vault_name, secret = %secret_name))]
    pub async fn fetch(
        &self,
        vault_name: &str,
        secret_name: &str,
        tenant_id: &SecretHandle,
        client_id: &SecretHandle,
        client_secret: &SecretHandle,
    ) -> KeyVaultResult<SecretString> {
        let endpoint = VaultEndpoint::from_name(vault_name, &self.config.vault_url_template)?;
        validate_secret_name(secret_name)?;

        let bundle = CredentialBundle::new(
            self.resolve("tenant id", tenant_id).await?,
            self.resolve("client id", client_id).await?,
            self.resolve("client secret", client_secret).await?,
        )?;

        let http = build_http_client(&self.config.http_config())
            .map_err(|e| KeyVaultError::client_construction(e.to_string()))?;
        let credential = default_credential_chain(bundle, &self.config, http.clone());
        let client =
            SecretClient::with_http_client(endpoint, Arc::new(credential), http, &self.config);

        let secret = client.get_secret(secret_name).await?;
        info!(version = ?secret.metadata.version, "Fetched secret");
        Ok(secret.value)
    }

    /// [`fetch`](Self::fetch) taking a request and handle set.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_request(
        &self,
        request: &SecretRequest,
        credentials: &CredentialHandles,
    ) -> KeyVaultResult<SecretString> {
        self.fetch(
            &request.vault_name,
            &request.secret_name,
            &credentials.tenant_id,
            &credentials.client_id,
            &credentials.client_secret,
        )
        .await
    }

    async fn resolve(&self, label: &str, handle: &SecretHandle) -> KeyVaultResult<SecretString> {
        self.source
            .resolve_plaintext(handle)
            .await
            .map_err(|e| KeyVaultError::credential_resolution(format!("{label} ({handle}): {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_env_handles() {
        let handles = CredentialHandles::from_azure_env();
        assert_eq!(handles.tenant_id.to_string(), "env:AZURE_TENANT_ID");
        assert_eq!(handles.client_id.to_string(), "env:AZURE_CLIENT_ID");
        assert_eq!(handles.client_secret.to_string(), "env:AZURE_CLIENT_SECRET");
    }

    #[test]
    fn test_request_new() {
        let request = SecretRequest::new("quickstart-kv", "test-secret1");
        assert_eq!(request.vault_name, "quickstart-kv");
        assert_eq!(request.secret_name, "test-secret1");
    }
}
