//! Token credentials built from explicit values.
//!
//! Credentials are handed to the chain directly. Nothing here reads or
//! writes process environment variables, so every fetch owns its own chain.

use crate::{
    config::KeyVaultConfig,
    error::{KeyVaultError, KeyVaultResult},
    secrets::{TokenErrorResponse, TokenResponse},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::{debug, instrument, warn};

const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
const MAX_TOKEN_LIFETIME_SECS: u64 = 86_400;

/// Tenant id, client id and client secret of a service principal.
#[derive(Clone)]
pub struct CredentialBundle {
    tenant_id: SecretString,
    client_id: SecretString,
    client_secret: SecretString,
}

impl CredentialBundle {
    /// Build a bundle, rejecting empty components.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::CredentialResolution`] naming the first
    /// component that is empty after trimming.
    pub fn new(
        tenant_id: SecretString,
        client_id: SecretString,
        client_secret: SecretString,
    ) -> KeyVaultResult<Self> {
        for (label, value) in [
            ("tenant id", &tenant_id),
            ("client id", &client_id),
            ("client secret", &client_secret),
        ] {
            if value.expose_secret().trim().is_empty() {
                return Err(KeyVaultError::credential_resolution(format!(
                    "{label} resolved to an empty value"
                )));
            }
        }

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
        })
    }

    /// Tenant id.
    #[must_use]
    pub const fn tenant_id(&self) -> &SecretString {
        &self.tenant_id
    }

    /// Client (application) id.
    #[must_use]
    pub const fn client_id(&self) -> &SecretString {
        &self.client_id
    }

    /// Client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("tenant_id", &"[REDACTED]")
            .field("client_id", &"[REDACTED]")
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token with its expiry.
#[derive(Clone)]
pub struct AccessToken {
    /// Bearer token
    pub token: SecretString,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Token expiring `lifetime_secs` from now.
    #[must_use]
    pub fn new(token: SecretString, lifetime_secs: u64) -> Self {
        let secs = i64::try_from(lifetime_secs.min(MAX_TOKEN_LIFETIME_SECS)).unwrap_or(0);
        Self {
            token,
            expires_at: Utc::now() + TimeDelta::seconds(secs),
        }
    }

    /// Whether the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in chain diagnostics.
    fn name(&self) -> &'static str;

    /// Obtain a token for the given scopes.
    async fn get_token(&self, scopes: &[String]) -> KeyVaultResult<AccessToken>;
}

/// OAuth2 client-credentials grant against Microsoft Entra ID.
pub struct ClientSecretCredential {
    bundle: CredentialBundle,
    authority_host: String,
    http: Client,
}

impl ClientSecretCredential {
    /// Create a credential for the given service principal.
    #[must_use]
    pub fn new(bundle: CredentialBundle, authority_host: impl Into<String>, http: Client) -> Self {
        Self {
            bundle,
            authority_host: authority_host.into(),
            http,
        }
    }

    fn token_url(&self) -> KeyVaultResult<String> {
        let tenant = self.bundle.tenant_id.expose_secret().trim();
        if !tenant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(KeyVaultError::auth_failed(
                "tenant id may only contain letters, digits, '-' and '.'",
            ));
        }
        Ok(format!(
            "{}/{tenant}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/')
        ))
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("bundle", &self.bundle)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &'static str {
        "ClientSecretCredential"
    }

    #[instrument(skip_all, fields(authority = %self.authority_host))]
    async fn get_token(&self, scopes: &[String]) -> KeyVaultResult<AccessToken> {
        let url = self.token_url()?;
        let scope = scopes.join(" ");
        let params = [
            ("client_id", self.bundle.client_id.expose_secret().trim()),
            ("client_secret", self.bundle.client_secret.expose_secret()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| KeyVaultError::auth_failed(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&text) {
                Ok(err) => format!(
                    "{}: {}",
                    err.error,
                    err.error_description.unwrap_or_default()
                ),
                Err(_) => text,
            };
            warn!(status = status.as_u16(), "Token endpoint rejected the request");
            return Err(KeyVaultError::auth_failed(format!(
                "token endpoint returned {status}: {detail}"
            )));
        }

        let payload: TokenResponse = response
            .json()
            .await
            .map_err(|e| KeyVaultError::auth_failed(format!("malformed token response: {e}")))?;

        let lifetime = payload.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        debug!(lifetime_secs = lifetime, "Obtained access token");
        Ok(AccessToken::new(SecretString::from(payload.access_token), lifetime))
    }
}

/// Credential returning a preconfigured bearer token.
pub struct StaticTokenCredential {
    token: SecretString,
}

impl StaticTokenCredential {
    /// Wrap an existing bearer token.
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &'static str {
        "StaticTokenCredential"
    }

    async fn get_token(&self, _scopes: &[String]) -> KeyVaultResult<AccessToken> {
        if self.token.expose_secret().is_empty() {
            return Err(KeyVaultError::auth_failed("static token is empty"));
        }
        Ok(AccessToken::new(self.token.clone(), DEFAULT_TOKEN_LIFETIME_SECS))
    }
}

/// Tries each credential in order until one yields a token.
#[derive(Default)]
pub struct ChainedTokenCredential {
    sources: Vec<Box<dyn TokenCredential>>,
}

impl ChainedTokenCredential {
    /// Create a chain from an ordered list of credentials.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    /// Append a credential to the end of the chain.
    #[must_use]
    pub fn with(mut self, credential: impl TokenCredential + 'static) -> Self {
        self.sources.push(Box::new(credential));
        self
    }

    /// Number of credentials in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl TokenCredential for ChainedTokenCredential {
    fn name(&self) -> &'static str {
        "ChainedTokenCredential"
    }

    async fn get_token(&self, scopes: &[String]) -> KeyVaultResult<AccessToken> {
        if self.sources.is_empty() {
            return Err(KeyVaultError::auth_failed("credential chain is empty"));
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.get_token(scopes).await {
                Ok(token) => {
                    debug!(credential = source.name(), "Credential produced a token");
                    return Ok(token);
                }
                Err(err) => {
                    debug!(credential = source.name(), error = %err, "Credential failed");
                    let message = match err {
                        KeyVaultError::Authentication(msg) => msg,
                        other => other.to_string(),
                    };
                    failures.push(format!("{}: {message}", source.name()));
                }
            }
        }

        Err(KeyVaultError::auth_failed(format!(
            "no credential in the chain produced a token ({})",
            failures.join("; ")
        )))
    }
}

/// The chain used by a fetch: a client-secret credential for the bundle.
#[must_use]
pub fn default_credential_chain(
    bundle: CredentialBundle,
    config: &KeyVaultConfig,
    http: Client,
) -> ChainedTokenCredential {
    ChainedTokenCredential::default().with(ClientSecretCredential::new(
        bundle,
        config.authority_host.clone(),
        http,
    ))
}
