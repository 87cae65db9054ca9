//! # Command Line Interface
//!
//! `keyvault get-secret` resolves the three credential handles, fetches the
//! latest value of one secret and prints it to stdout. Logs go to stderr.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use keyvault_client::{HandleResolver, KeyVaultConfig, SecretFetcher, SecretHandle, SecretSource};
use rust_common::{TracingConfig, init_tracing};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use std::time::Duration;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "keyvault")]
#[command(about = "Fetch secrets from Azure Key Vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the latest value of a secret
    GetSecret(GetSecretArgs),
}

/// Arguments of `get-secret`.
///
/// Credential flags take handles, not values: `env:NAME`, `file:PATH` or
/// `cmd:COMMAND`.
#[derive(Args, Debug, Clone)]
pub struct GetSecretArgs {
    /// Key Vault name, expanded to https://{name}.vault.azure.net/
    #[arg(long, env = "KEYVAULT_NAME")]
    pub key_vault_name: String,

    /// Name of the secret to fetch
    #[arg(long)]
    pub secret_name: String,

    /// Handle resolving to the tenant id
    #[arg(long)]
    pub tenant_id: SecretHandle,

    /// Handle resolving to the client id
    #[arg(long)]
    pub client_id: SecretHandle,

    /// Handle resolving to the client secret
    #[arg(long)]
    pub client_secret: SecretHandle,

    /// Accept authentication challenges naming a resource outside the vault's domain
    #[arg(long)]
    pub disable_challenge_resource_verification: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl GetSecretArgs {
    /// Layer command-line overrides onto a base configuration.
    #[must_use]
    pub fn apply(&self, mut config: KeyVaultConfig) -> KeyVaultConfig {
        if self.disable_challenge_resource_verification {
            config = config.with_challenge_resource_verification_disabled();
        }
        if let Some(secs) = self.timeout.filter(|s| *s > 0) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    initialise_logging(cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::GetSecret(args) => {
            let config = KeyVaultConfig::from_env().context("invalid KEYVAULT_* configuration")?;
            tracing::debug!(
                vault = %args.key_vault_name,
                secret = %args.secret_name,
                verify_challenge_resource = !config.disable_challenge_resource_verification,
                "get-secret"
            );
            let value = get_secret(HandleResolver, &args, config).await?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", value.expose_secret())?;
        }
    }

    Ok(())
}

/// Fetch the secret described by `args`, resolving handles through `source`.
pub async fn get_secret<S: SecretSource>(
    source: S,
    args: &GetSecretArgs,
    config: KeyVaultConfig,
) -> anyhow::Result<SecretString> {
    let fetcher = SecretFetcher::new(source, args.apply(config));
    fetcher
        .fetch(
            &args.key_vault_name,
            &args.secret_name,
            &args.tenant_id,
            &args.client_id,
            &args.client_secret,
        )
        .await
        .with_context(|| {
            format!(
                "failed to fetch secret '{}' from vault '{}'",
                args.secret_name, args.key_vault_name
            )
        })
}

fn initialise_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    let mut config = TracingConfig::default().with_service_name("keyvault-cli");
    if verbose {
        config = config.with_log_level("debug");
    }
    if json {
        config = config.with_json_output();
    }
    init_tracing(&config)?;
    Ok(())
}
