//! Command-line access to Azure Key Vault secrets.

pub mod cli;
