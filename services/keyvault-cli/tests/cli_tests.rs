//! CLI argument handling and an end-to-end `get-secret` run.

use clap::Parser;
use keyvault_cli::cli::{Cli, Commands, GetSecretArgs, get_secret};
use keyvault_client::{KeyVaultConfig, KeyVaultError, SecretHandle};
use secrecy::ExposeSecret;
use std::time::Duration;
use test_utils::fixtures::{
    SAMPLE_ACCESS_TOKEN, SAMPLE_CLIENT_ID, SAMPLE_CLIENT_SECRET, SAMPLE_SECRET, SAMPLE_TENANT,
    SAMPLE_VALUE, SAMPLE_VAULT, SAMPLE_VERSION, bearer_challenge, secret_bundle, token_response,
};
use test_utils::mocks::MockSecretSource;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
    let mut args = vec![
        "keyvault",
        "get-secret",
        "--key-vault-name",
        SAMPLE_VAULT,
        "--secret-name",
        SAMPLE_SECRET,
        "--tenant-id=env:AZURE_TENANT_ID",
        "--client-id=env:AZURE_CLIENT_ID",
    ];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args)
}

fn get_secret_args(cli: Cli) -> GetSecretArgs {
    match cli.command {
        Commands::GetSecret(args) => args,
    }
}

#[test]
fn parses_get_secret_with_handles() {
    let cli = parse(&["--client-secret", "file:/run/secrets/azure-client-secret"]).unwrap();
    assert!(!cli.verbose);

    let args = get_secret_args(cli);
    assert_eq!(args.key_vault_name, SAMPLE_VAULT);
    assert_eq!(args.secret_name, SAMPLE_SECRET);
    assert_eq!(args.tenant_id, SecretHandle::env("AZURE_TENANT_ID"));
    assert_eq!(args.client_id, SecretHandle::env("AZURE_CLIENT_ID"));
    assert_eq!(
        args.client_secret,
        SecretHandle::file("/run/secrets/azure-client-secret")
    );
    assert!(!args.disable_challenge_resource_verification);
}

#[test]
fn missing_credential_flag_is_rejected() {
    assert!(parse(&[]).is_err());
}

#[test]
fn plaintext_credential_is_rejected() {
    assert!(parse(&["--client-secret", "not-a-handle"]).is_err());
}

#[test]
fn flags_override_configuration() {
    let cli = parse(&[
        "--client-secret=env:AZURE_CLIENT_SECRET",
        "--disable-challenge-resource-verification",
        "--timeout",
        "15",
        "--verbose",
    ])
    .unwrap();
    assert!(cli.verbose);

    let config = get_secret_args(cli).apply(KeyVaultConfig::default());
    assert!(config.disable_challenge_resource_verification);
    assert_eq!(config.timeout, Some(Duration::from_secs(15)));
}

#[tokio::test]
async fn get_secret_prints_remote_value() {
    let server = MockServer::start().await;
    let secret_path = format!("/{SAMPLE_VAULT}/secrets/{SAMPLE_SECRET}/");
    let vault_url = format!("{}/{SAMPLE_VAULT}", server.uri());

    Mock::given(method("GET"))
        .and(path(secret_path.clone()))
        .and(header("authorization", format!("Bearer {SAMPLE_ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(secret_bundle(
            &vault_url,
            SAMPLE_SECRET,
            SAMPLE_VALUE,
            SAMPLE_VERSION,
        )))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(secret_path))
        .respond_with(ResponseTemplate::new(401).insert_header(
            "WWW-Authenticate",
            bearer_challenge(&format!("{}/aad/{SAMPLE_TENANT}", server.uri()), &server.uri()),
        ))
        .with_priority(10)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/aad/{SAMPLE_TENANT}/oauth2/v2.0/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(SAMPLE_ACCESS_TOKEN)))
        .mount(&server)
        .await;

    let args = get_secret_args(parse(&["--client-secret=env:AZURE_CLIENT_SECRET"]).unwrap());
    let source = MockSecretSource::with_values([
        (args.tenant_id.clone(), SAMPLE_TENANT),
        (args.client_id.clone(), SAMPLE_CLIENT_ID),
        (args.client_secret.clone(), SAMPLE_CLIENT_SECRET),
    ]);
    let config = KeyVaultConfig::default()
        .with_vault_url_template(format!("{}/{{name}}/", server.uri()))
        .with_authority_host(format!("{}/aad", server.uri()));

    let value = get_secret(source, &args, config).await.unwrap();
    assert_eq!(value.expose_secret(), SAMPLE_VALUE);
}

#[tokio::test]
async fn get_secret_reports_failing_step() {
    let args = get_secret_args(parse(&["--client-secret=env:AZURE_CLIENT_SECRET"]).unwrap());
    let err = get_secret(MockSecretSource::new(), &args, KeyVaultConfig::default())
        .await
        .unwrap_err();

    assert!(err.to_string().contains(SAMPLE_SECRET));
    assert!(matches!(
        err.downcast_ref::<KeyVaultError>(),
        Some(KeyVaultError::CredentialResolution(_))
    ));
}
