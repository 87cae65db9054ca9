//! Key Vault secrets client with challenge-based authentication.

use crate::{
    challenge::AuthChallenge,
    config::{KeyVaultConfig, VaultEndpoint, validate_secret_name, validate_secret_version},
    credential::{AccessToken, TokenCredential},
    error::{KeyVaultError, KeyVaultResult},
    provider::{KeyVaultSecret, SecretProvider},
    secrets::{KeyVaultErrorResponse, SecretBundle},
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header::WWW_AUTHENTICATE};
use rust_common::{PlatformError, build_http_client};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// Client bound to a single vault.
pub struct SecretClient {
    endpoint: VaultEndpoint,
    credential: Arc<dyn TokenCredential>,
    http: Client,
    api_version: String,
    verify_challenge_resource: bool,
}

impl SecretClient {
    /// Create a client with its own HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::ClientConstruction`] if the transport
    /// cannot be built.
    pub fn new(
        endpoint: VaultEndpoint,
        credential: Arc<dyn TokenCredential>,
        config: &KeyVaultConfig,
    ) -> KeyVaultResult<Self> {
        let http = build_http_client(&config.http_config())
            .map_err(|e| KeyVaultError::client_construction(e.to_string()))?;
        Ok(Self::with_http_client(endpoint, credential, http, config))
    }

    /// Create a client sharing an existing HTTP transport.
    #[must_use]
    pub fn with_http_client(
        endpoint: VaultEndpoint,
        credential: Arc<dyn TokenCredential>,
        http: Client,
        config: &KeyVaultConfig,
    ) -> Self {
        if config.disable_challenge_resource_verification {
            warn!(vault = %endpoint, "Challenge resource verification is disabled");
        }
        Self {
            endpoint,
            credential,
            http,
            api_version: config.api_version.clone(),
            verify_challenge_resource: !config.disable_challenge_resource_verification,
        }
    }

    /// Vault this client talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &VaultEndpoint {
        &self.endpoint
    }

    #[instrument(skip(self), fields(vault = %self.endpoint.name()))]
    async fn lookup(&self, name: &str, version: &str) -> KeyVaultResult<KeyVaultSecret> {
        validate_secret_name(name)?;
        validate_secret_version(version)?;
        let url = self.endpoint.secret_url(name, version, &self.api_version)?;

        let response = self.send(&url, None).await?;
        let response = if response.status() == StatusCode::UNAUTHORIZED {
            let token = self.answer_challenge(&response).await?;
            self.send(&url, Some(&token)).await?
        } else {
            response
        };

        self.read_secret(response, name).await
    }

    async fn send(&self, url: &Url, token: Option<&AccessToken>) -> KeyVaultResult<Response> {
        let mut request = self.http.get(url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token.token.expose_secret());
        }
        request
            .send()
            .await
            .map_err(|e| KeyVaultError::Platform(PlatformError::from_transport(e)))
    }

    async fn answer_challenge(&self, response: &Response) -> KeyVaultResult<AccessToken> {
        let header = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| KeyVaultError::auth_failed("vault returned 401 without a challenge"))?;

        let challenge = AuthChallenge::parse(header).ok_or_else(|| {
            KeyVaultError::auth_failed(format!("unsupported authentication challenge '{header}'"))
        })?;

        if self.verify_challenge_resource {
            challenge.verify_resource(self.endpoint.url())?;
        }

        let scope = challenge
            .token_scope()
            .ok_or_else(|| KeyVaultError::auth_failed("challenge names no resource or scope"))?;
        debug!(%scope, "Answering authentication challenge");

        self.credential.get_token(&[scope]).await
    }

    async fn read_secret(&self, response: Response, name: &str) -> KeyVaultResult<KeyVaultSecret> {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(KeyVaultError::not_found(name)),
            StatusCode::UNAUTHORIZED => {
                let (_, message) = error_body(response).await;
                return Err(KeyVaultError::auth_failed(format!(
                    "vault rejected the bearer token: {message}"
                )));
            }
            s if !s.is_success() => {
                let (code, message) = error_body(response).await;
                return Err(KeyVaultError::RemoteLookup {
                    status: s.as_u16(),
                    code,
                    message,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        let bundle: SecretBundle = serde_json::from_str(&body)?;
        let secret = bundle.into_secret().ok_or_else(|| KeyVaultError::RemoteLookup {
            status: status.as_u16(),
            code: "MissingValue".to_string(),
            message: format!(
                "vault {} returned no value for secret '{name}'",
                self.endpoint
            ),
        })?;

        debug!(version = ?secret.metadata.version, "Secret retrieved");
        Ok(secret)
    }
}

async fn error_body(response: Response) -> (String, String) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<KeyVaultErrorResponse>(&text) {
        Ok(body) => (body.error.code, body.error.message),
        Err(_) => (status.canonical_reason().unwrap_or("Unknown").to_string(), text),
    }
}

#[async_trait]
impl SecretProvider for SecretClient {
    async fn get_secret(&self, name: &str) -> KeyVaultResult<KeyVaultSecret> {
        self.lookup(name, "").await
    }

    async fn get_secret_version(
        &self,
        name: &str,
        version: &str,
    ) -> KeyVaultResult<KeyVaultSecret> {
        self.lookup(name, version).await
    }
}
