//! Azure Key Vault secret fetcher.
//!
//! Resolves service-principal credentials from a [`SecretSource`], builds an
//! explicit credential chain from them, and performs a single lookup of a
//! named secret at its latest version. No process-wide state is touched, so
//! concurrent fetches with different credentials are independent.
//!
//! ```no_run
//! use keyvault_client::{HandleResolver, KeyVaultConfig, SecretFetcher, SecretHandle};
//! use secrecy::ExposeSecret;
//!
//! # async fn run() -> keyvault_client::KeyVaultResult<()> {
//! let fetcher = SecretFetcher::new(HandleResolver, KeyVaultConfig::default());
//! let value = fetcher
//!     .fetch(
//!         "quickstart-kv",
//!         "test-secret1",
//!         &"env:AZURE_TENANT_ID".parse::<SecretHandle>()?,
//!         &"env:AZURE_CLIENT_ID".parse::<SecretHandle>()?,
//!         &"env:AZURE_CLIENT_SECRET".parse::<SecretHandle>()?,
//!     )
//!     .await?;
//! println!("{}", value.expose_secret());
//! # Ok(())
//! # }
//! ```

pub mod challenge;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod fetcher;
pub mod provider;
pub mod secrets;
pub mod source;

pub use client::SecretClient;
pub use config::{KeyVaultConfig, VaultEndpoint, vault_url};
pub use credential::{
    AccessToken, ChainedTokenCredential, ClientSecretCredential, CredentialBundle,
    StaticTokenCredential, TokenCredential, default_credential_chain,
};
pub use error::{KeyVaultError, KeyVaultResult};
pub use fetcher::{CredentialHandles, SecretFetcher, SecretRequest};
pub use provider::{KeyVaultSecret, SecretMetadata, SecretProvider};
pub use source::{HandleResolver, SecretHandle, SecretSource, SourceError};
