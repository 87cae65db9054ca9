//! Key Vault and identity-provider wire types.

use crate::provider::{KeyVaultSecret, SecretMetadata};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

/// Key Vault `SecretBundle` response.
///
/// Holds the plaintext value, so it deliberately has no `Debug`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretBundle {
    pub value: Option<String>,
    pub id: Option<String>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub attributes: SecretAttributes,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub kid: Option<String>,
    #[serde(default)]
    pub managed: bool,
}

/// Secret attributes; timestamps are Unix seconds.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretAttributes {
    pub enabled: Option<bool>,
    pub created: Option<i64>,
    pub updated: Option<i64>,
    pub exp: Option<i64>,
    pub nbf: Option<i64>,
    pub recovery_level: Option<String>,
}

impl SecretBundle {
    /// Split into the secret value and its metadata.
    ///
    /// Returns `None` when the response carries no value.
    #[must_use]
    pub fn into_secret(self) -> Option<KeyVaultSecret> {
        let value = SecretString::from(self.value?);
        let version = self
            .id
            .as_deref()
            .and_then(|id| id.trim_end_matches('/').rsplit('/').next())
            .map(str::to_string);

        let metadata = SecretMetadata {
            id: self.id,
            version,
            content_type: self.content_type,
            enabled: self.attributes.enabled,
            created: self.attributes.created.and_then(timestamp),
            updated: self.attributes.updated.and_then(timestamp),
            expires: self.attributes.exp.and_then(timestamp),
            not_before: self.attributes.nbf.and_then(timestamp),
            recovery_level: self.attributes.recovery_level,
            tags: self.tags,
            key_id: self.kid,
            managed: self.managed,
        };

        Some(KeyVaultSecret { value, metadata })
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Key Vault error envelope.
#[derive(Debug, Deserialize)]
pub struct KeyVaultErrorResponse {
    pub error: KeyVaultErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct KeyVaultErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// OAuth2 token endpoint success response. Holds the token; no `Debug`.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// OAuth2 token endpoint error response.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_parse_secret_bundle() {
        let body = serde_json::json!({
            "value": "hello-world",
            "id": "https://quickstart-kv.vault.azure.net/secrets/test-secret1/4387e9f3d6e14c459867679a90fd0f79",
            "contentType": "text/plain",
            "attributes": {
                "enabled": true,
                "created": 1_700_000_000,
                "updated": 1_700_000_100,
                "recoveryLevel": "Recoverable+Purgeable"
            },
            "tags": { "env": "dev" }
        });

        let bundle: SecretBundle = serde_json::from_value(body).unwrap();
        let secret = bundle.into_secret().unwrap();

        assert_eq!(secret.value.expose_secret(), "hello-world");
        assert_eq!(
            secret.metadata.version.as_deref(),
            Some("4387e9f3d6e14c459867679a90fd0f79")
        );
        assert_eq!(secret.metadata.content_type.as_deref(), Some("text/plain"));
        assert_eq!(secret.metadata.enabled, Some(true));
        assert_eq!(secret.metadata.created.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(secret.metadata.tags.get("env").map(String::as_str), Some("dev"));
        assert!(!secret.metadata.managed);
    }

    #[test]
    fn test_bundle_without_value() {
        let bundle: SecretBundle = serde_json::from_value(serde_json::json!({
            "id": "https://quickstart-kv.vault.azure.net/secrets/test-secret1/abc"
        }))
        .unwrap();
        assert!(bundle.into_secret().is_none());
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"error":{"code":"SecretNotFound","message":"A secret with (name/id) nope was not found in this key vault."}}"#;
        let parsed: KeyVaultErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, "SecretNotFound");
    }

    #[test]
    fn test_parse_token_error() {
        let body = r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#;
        let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error, "invalid_client");
        assert!(parsed.error_description.unwrap().starts_with("AADSTS7000215"));
    }
}
