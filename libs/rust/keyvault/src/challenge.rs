//! Bearer challenges from `WWW-Authenticate` headers.
//!
//! Key Vault answers an unauthenticated request with `401` and a challenge
//! naming the authority and the resource a token must be issued for.

use crate::error::{KeyVaultError, KeyVaultResult};
use url::Url;

/// Parsed `Bearer` challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthChallenge {
    /// Authority URL, e.g. `https://login.microsoftonline.com/{tenant}`
    pub authorization: Option<String>,
    /// Resource the token must target
    pub resource: Option<String>,
    /// Explicit scope, preferred over `resource`
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parse a `WWW-Authenticate` header value.
    ///
    /// Returns `None` unless it is a `Bearer` challenge.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace).unwrap_or((header, ""));
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }

        let mut challenge = Self::default();
        for pair in params.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            if value.is_empty() {
                continue;
            }
            match key.trim().to_ascii_lowercase().as_str() {
                "authorization" | "authorization_uri" => challenge.authorization = Some(value),
                "resource" => challenge.resource = Some(value),
                "scope" => challenge.scope = Some(value),
                _ => {}
            }
        }
        Some(challenge)
    }

    /// Token scope requested by the challenge.
    #[must_use]
    pub fn token_scope(&self) -> Option<String> {
        self.scope.clone().or_else(|| {
            self.resource
                .as_deref()
                .map(|r| format!("{}/.default", r.trim_end_matches('/')))
        })
    }

    /// Check the challenge resource belongs to the vault's host.
    ///
    /// The resource host must equal the vault host or be a DNS parent of
    /// it, so `vault.azure.net` is accepted for `kv.vault.azure.net`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::Authentication`] on a mismatch or when the
    /// challenge names no parseable resource.
    pub fn verify_resource(&self, vault: &Url) -> KeyVaultResult<()> {
        let target = self
            .scope
            .as_deref()
            .or(self.resource.as_deref())
            .ok_or_else(|| KeyVaultError::auth_failed("challenge names no resource or scope"))?;

        let resource_host = Url::parse(target)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .ok_or_else(|| {
                KeyVaultError::auth_failed(format!("challenge resource '{target}' is not a URL"))
            })?;
        let vault_host = vault.host_str().unwrap_or_default().to_ascii_lowercase();

        if vault_host == resource_host || vault_host.ends_with(&format!(".{resource_host}")) {
            Ok(())
        } else {
            Err(KeyVaultError::auth_failed(format!(
                "challenge resource host '{resource_host}' does not match vault host '{vault_host}'"
            )))
        }
    }
}
