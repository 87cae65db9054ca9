//! Key Vault and identity-provider response fixtures.

use serde_json::{Value, json};

/// Sample vault used across tests.
pub const SAMPLE_VAULT: &str = "quickstart-kv";
/// Sample secret name.
pub const SAMPLE_SECRET: &str = "test-secret1";
/// Sample secret value.
pub const SAMPLE_VALUE: &str = "hello-world";
/// Sample secret version.
pub const SAMPLE_VERSION: &str = "4387e9f3d6e14c459867679a90fd0f79";
/// Sample tenant id.
pub const SAMPLE_TENANT: &str = "72f988bf-86f1-41af-91ab-2d7cd011db47";
/// Sample client id.
pub const SAMPLE_CLIENT_ID: &str = "0b1c2d3e-4f50-6172-8394-a5b6c7d8e9f0";
/// Sample client secret.
pub const SAMPLE_CLIENT_SECRET: &str = "s3cr3t~client.value_0123456789";
/// Sample bearer token.
pub const SAMPLE_ACCESS_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9.sample.signature";

/// `SecretBundle` body for a secret under `vault_url`.
#[must_use]
pub fn secret_bundle(vault_url: &str, name: &str, value: &str, version: &str) -> Value {
    json!({
        "value": value,
        "id": format!("{}/secrets/{name}/{version}", vault_url.trim_end_matches('/')),
        "attributes": {
            "enabled": true,
            "created": 1_700_000_000,
            "updated": 1_700_000_000,
            "recoveryLevel": "Recoverable+Purgeable",
            "recoverableDays": 90
        },
        "tags": {}
    })
}

/// Key Vault `SecretNotFound` error body.
#[must_use]
pub fn secret_not_found(name: &str) -> Value {
    json!({
        "error": {
            "code": "SecretNotFound",
            "message": format!("A secret with (name/id) {name} was not found in this key vault. If you recently deleted this secret you may be able to recover it using the correct recovery command.")
        }
    })
}

/// Key Vault `Forbidden` error body.
#[must_use]
pub fn forbidden() -> Value {
    json!({
        "error": {
            "code": "Forbidden",
            "message": "The user, group or application does not have secrets get permission on key vault."
        }
    })
}

/// Key Vault `Unauthorized` error body sent with a challenge.
#[must_use]
pub fn unauthorized() -> Value {
    json!({
        "error": {
            "code": "Unauthorized",
            "message": "AKV10000: Request is missing a Bearer or PoP token."
        }
    })
}

/// `WWW-Authenticate` header naming `resource`.
#[must_use]
pub fn bearer_challenge(authority: &str, resource: &str) -> String {
    format!(r#"Bearer authorization="{authority}", resource="{resource}""#)
}

/// Token endpoint success body.
#[must_use]
pub fn token_response(access_token: &str) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "ext_expires_in": 3599,
        "access_token": access_token
    })
}

/// Token endpoint `invalid_client` error body.
#[must_use]
pub fn invalid_client() -> Value {
    json!({
        "error": "invalid_client",
        "error_description": "AADSTS7000215: Invalid client secret provided.",
        "error_codes": [7_000_215]
    })
}
