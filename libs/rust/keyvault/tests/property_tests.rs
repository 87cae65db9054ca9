//! Property-based tests for the Key Vault client.
//!
//! Tests validate:
//! - Vault URL construction is deterministic for every valid name
//! - Invalid vault names never produce an endpoint
//! - Secret material never appears in debug output

use keyvault_client::{
    AccessToken, CredentialBundle, KeyVaultError, KeyVaultSecret, SecretHandle, SecretMetadata,
    vault_url,
};
use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};
use test_utils::{
    credential_triple_strategy, invalid_vault_name_strategy, secret_name_strategy,
    secret_value_strategy, vault_name_strategy,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every valid vault name expands to exactly `https://{name}.vault.azure.net/`.
    #[test]
    fn prop_vault_url_is_deterministic(name in vault_name_strategy()) {
        let first = vault_url(&name).unwrap();
        let second = vault_url(&name).unwrap();

        prop_assert_eq!(&first, &format!("https://{name}.vault.azure.net/"));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_invalid_vault_names_rejected(name in invalid_vault_name_strategy()) {
        prop_assert!(matches!(vault_url(&name), Err(KeyVaultError::ClientConstruction(_))));
    }

    #[test]
    fn prop_credential_bundle_redacted(
        (tenant, client, secret) in credential_triple_strategy(),
    ) {
        let bundle = CredentialBundle::new(
            SecretString::from(tenant.clone()),
            SecretString::from(client.clone()),
            SecretString::from(secret.clone()),
        )
        .unwrap();

        let debug_output = format!("{bundle:?}");

        prop_assert!(!debug_output.contains(&tenant));
        prop_assert!(!debug_output.contains(&client));
        prop_assert!(!debug_output.contains(&secret));
        prop_assert!(debug_output.contains("[REDACTED]"));

        prop_assert_eq!(bundle.client_secret().expose_secret(), secret.as_str());
    }

    #[test]
    fn prop_secret_value_not_in_debug(
        value in secret_value_strategy(),
        name in secret_name_strategy(),
    ) {
        let secret = KeyVaultSecret {
            value: SecretString::from(value.clone()),
            metadata: SecretMetadata {
                id: Some(format!("https://quickstart-kv.vault.azure.net/secrets/{name}/abc")),
                ..SecretMetadata::default()
            },
        };

        let debug_output = format!("{secret:?}");

        prop_assert!(!debug_output.contains(&value));
        prop_assert!(debug_output.contains(&name));
        prop_assert_eq!(secret.value.expose_secret(), value.as_str());
    }

    #[test]
    fn prop_access_token_not_in_debug(token in secret_value_strategy()) {
        let access = AccessToken::new(SecretString::from(token.clone()), 3600);
        let debug_output = format!("{access:?}");

        prop_assert!(!debug_output.contains(&token));
        prop_assert!(!access.is_expired());
    }

    #[test]
    fn prop_env_handles_round_trip(name in "[A-Z][A-Z0-9_]{0,30}") {
        let handle = SecretHandle::env(name);
        let parsed: SecretHandle = handle.to_string().parse().unwrap();
        prop_assert_eq!(parsed, handle);
    }
}

#[test]
fn test_quickstart_vault_url() {
    assert_eq!(
        vault_url("quickstart-kv").unwrap(),
        "https://quickstart-kv.vault.azure.net/"
    );
}
