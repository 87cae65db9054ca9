//! Shared proptest generators.

use proptest::prelude::*;

/// Generate valid Key Vault names: 3-24 characters, starting with a letter,
/// ending with a letter or digit, without consecutive hyphens.
pub fn vault_name_strategy() -> impl Strategy<Value = String> {
    ("[a-z]", prop::collection::vec("[a-z0-9]{1,4}", 1..5))
        .prop_map(|(first, segments)| format!("{first}{}", segments.join("-")))
        .prop_filter("vault names are 3-24 characters", |name| {
            (3..=24).contains(&name.len())
        })
}

/// Generate strings that are never valid vault names.
pub fn invalid_vault_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,2}",
        "[a-z]{25,40}",
        "[0-9][a-z0-9]{3,10}",
        "[a-z]{3,10}-",
        "[a-z]{2,5}--[a-z]{2,5}",
        "[a-z]{2,5}[_./][a-z]{2,5}",
    ]
}

/// Generate valid secret names.
pub fn secret_name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9-]{0,40}"
}

/// Generate secret values.
pub fn secret_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{8,64}"
}

/// Generate (tenant id, client id, client secret) triples.
pub fn credential_triple_strategy() -> impl Strategy<Value = (String, String, String)> {
    (
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "[A-Za-z0-9~._-]{24,40}",
    )
}
