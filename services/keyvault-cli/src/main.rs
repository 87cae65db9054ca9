//! `keyvault` binary: fetches Azure Key Vault secrets from the command line.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match keyvault_cli::cli::run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
