//! Key Vault client configuration and endpoint resolution.

use crate::error::{KeyVaultError, KeyVaultResult};
use rust_common::{HttpConfig, PlatformError};
use std::{env, fmt, time::Duration};
use url::Url;

/// Template expanding a vault name into its public-cloud endpoint.
pub const DEFAULT_VAULT_URL_TEMPLATE: &str = "https://{name}.vault.azure.net/";

/// Microsoft Entra ID authority for the public cloud.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Key Vault REST API version.
pub const DEFAULT_API_VERSION: &str = "7.4";

const NAME_PLACEHOLDER: &str = "{name}";

/// Key Vault client configuration.
#[derive(Debug, Clone)]
pub struct KeyVaultConfig {
    /// Vault URL template; `{name}` is replaced with the vault name
    pub vault_url_template: String,
    /// Identity provider authority host
    pub authority_host: String,
    /// REST API version sent as `api-version`
    pub api_version: String,
    /// Optional request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    /// Skip checking that the auth challenge resource matches the vault host.
    ///
    /// Disabling the check lets a server at the vault address direct the
    /// client to request tokens for a different resource. Leave it off
    /// unless the vault sits behind a proxy or emulator that rewrites hosts.
    pub disable_challenge_resource_verification: bool,
}

impl Default for KeyVaultConfig {
    fn default() -> Self {
        Self {
            vault_url_template: DEFAULT_VAULT_URL_TEMPLATE.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
            disable_challenge_resource_verification: false,
        }
    }
}

impl KeyVaultConfig {
    /// Load configuration from `KEYVAULT_*` environment variables.
    ///
    /// Unset variables keep their defaults. A timeout of `0` means no
    /// override.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> KeyVaultResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from `KEYVAULT_*` variables supplied by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::Platform`] wrapping
    /// [`PlatformError::InvalidInput`] for an unparseable timeout or flag,
    /// and [`KeyVaultError::ClientConstruction`] if the result fails
    /// [`validate`](Self::validate).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> KeyVaultResult<Self> {
        let defaults = Self::default();

        let vault_url_template =
            lookup("KEYVAULT_URL_TEMPLATE").unwrap_or(defaults.vault_url_template);
        let authority_host = lookup("KEYVAULT_AUTHORITY_HOST").unwrap_or(defaults.authority_host);
        let api_version = lookup("KEYVAULT_API_VERSION").unwrap_or(defaults.api_version);
        let timeout_secs: u64 =
            parse_var("KEYVAULT_HTTP_TIMEOUT_SECS", lookup("KEYVAULT_HTTP_TIMEOUT_SECS"), 0)?;
        let disable_challenge_resource_verification = parse_flag(
            "KEYVAULT_DISABLE_CHALLENGE_RESOURCE_VERIFICATION",
            lookup("KEYVAULT_DISABLE_CHALLENGE_RESOURCE_VERIFICATION"),
        )?;

        let config = Self {
            vault_url_template,
            authority_host,
            api_version,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            disable_challenge_resource_verification,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the vault URL template.
    #[must_use]
    pub fn with_vault_url_template(mut self, template: impl Into<String>) -> Self {
        self.vault_url_template = template.into();
        self
    }

    /// Set the identity provider authority host.
    #[must_use]
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Opt out of challenge-resource verification.
    #[must_use]
    pub const fn with_challenge_resource_verification_disabled(mut self) -> Self {
        self.disable_challenge_resource_verification = true;
        self
    }

    /// Check the template and authority host are usable.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::ClientConstruction`] for a template without
    /// a `{name}` placeholder or an authority host that is not a URL.
    pub fn validate(&self) -> KeyVaultResult<()> {
        if !self.vault_url_template.contains(NAME_PLACEHOLDER) {
            return Err(KeyVaultError::client_construction(format!(
                "vault URL template '{}' has no {NAME_PLACEHOLDER} placeholder",
                self.vault_url_template
            )));
        }
        Url::parse(&self.authority_host).map_err(|e| {
            KeyVaultError::client_construction(format!(
                "invalid authority host '{}': {e}",
                self.authority_host
            ))
        })?;
        Ok(())
    }

    /// HTTP settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        let config = HttpConfig::default();
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

/// A resolved vault endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEndpoint {
    name: String,
    url: Url,
}

impl VaultEndpoint {
    /// Expand a vault name with the given template.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::ClientConstruction`] for an invalid vault
    /// name or a template that does not produce a URL.
    pub fn from_name(name: &str, template: &str) -> KeyVaultResult<Self> {
        validate_vault_name(name)?;
        if !template.contains(NAME_PLACEHOLDER) {
            return Err(KeyVaultError::client_construction(format!(
                "vault URL template '{template}' has no {NAME_PLACEHOLDER} placeholder"
            )));
        }
        let expanded = template.replace(NAME_PLACEHOLDER, name);
        let mut endpoint = Self::from_url(&expanded)?;
        endpoint.name = name.to_string();
        Ok(endpoint)
    }

    /// Use a fully-qualified vault URL directly.
    ///
    /// The vault name is taken from the first label of the host.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::ClientConstruction`] if the URL does not
    /// parse or has no host.
    pub fn from_url(url: &str) -> KeyVaultResult<Self> {
        let mut url = Url::parse(url).map_err(|e| {
            KeyVaultError::client_construction(format!("malformed vault URL '{url}': {e}"))
        })?;
        let host = url.host_str().ok_or_else(|| {
            KeyVaultError::client_construction(format!("vault URL '{url}' has no host"))
        })?;
        let name = host.split('.').next().unwrap_or(host).to_string();

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { name, url })
    }

    /// Vault name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vault base URL, always ending in `/`.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Vault host.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// URL of a secret lookup. An empty version selects the latest.
    ///
    /// # Errors
    ///
    /// Returns [`KeyVaultError::ClientConstruction`] if the path cannot be
    /// joined onto the vault URL.
    pub fn secret_url(&self, name: &str, version: &str, api_version: &str) -> KeyVaultResult<Url> {
        let mut url = self
            .url
            .join(&format!("secrets/{name}/{version}"))
            .map_err(|e| KeyVaultError::client_construction(e.to_string()))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }
}

impl fmt::Display for VaultEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Expand a vault name into its public-cloud URL.
///
/// ```
/// assert_eq!(
///     keyvault_client::vault_url("quickstart-kv").unwrap(),
///     "https://quickstart-kv.vault.azure.net/"
/// );
/// ```
///
/// # Errors
///
/// Returns [`KeyVaultError::ClientConstruction`] for an invalid vault name.
pub fn vault_url(name: &str) -> KeyVaultResult<String> {
    VaultEndpoint::from_name(name, DEFAULT_VAULT_URL_TEMPLATE).map(|e| e.url.to_string())
}

/// Vault names are 3-24 characters of letters, digits and hyphens, start
/// with a letter, end with a letter or digit, with no consecutive hyphens.
///
/// # Errors
///
/// Returns [`KeyVaultError::ClientConstruction`] describing the violation.
pub fn validate_vault_name(name: &str) -> KeyVaultResult<()> {
    let invalid = |reason: &str| {
        Err(KeyVaultError::client_construction(format!(
            "invalid vault name '{name}': {reason}"
        )))
    };

    if !(3..=24).contains(&name.len()) {
        return invalid("must be 3-24 characters");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return invalid("only letters, digits and hyphens are allowed");
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return invalid("must start with a letter");
    }
    if name.ends_with('-') {
        return invalid("must end with a letter or digit");
    }
    if name.contains("--") {
        return invalid("consecutive hyphens are not allowed");
    }
    Ok(())
}

/// Secret names are 1-127 characters of letters, digits and hyphens.
///
/// # Errors
///
/// Returns [`KeyVaultError::InvalidInput`] describing the violation.
pub fn validate_secret_name(name: &str) -> KeyVaultResult<()> {
    if name.is_empty() || name.len() > 127 {
        return Err(KeyVaultError::invalid_input(format!(
            "invalid secret name '{name}': must be 1-127 characters"
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(KeyVaultError::invalid_input(format!(
            "invalid secret name '{name}': only letters, digits and hyphens are allowed"
        )));
    }
    Ok(())
}

/// Secret versions are opaque alphanumeric identifiers; empty means latest.
///
/// # Errors
///
/// Returns [`KeyVaultError::InvalidInput`] for any other character.
pub fn validate_secret_version(version: &str) -> KeyVaultResult<()> {
    if version.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(KeyVaultError::invalid_input(format!(
            "invalid secret version '{version}'"
        )))
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> Result<T, PlatformError>
where
    T::Err: fmt::Display,
{
    match value {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| PlatformError::invalid_input(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

fn parse_flag(name: &str, value: Option<String>) -> Result<bool, PlatformError> {
    match value {
        Some(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "" | "0" | "false" | "no" | "off" => Ok(false),
            other => Err(PlatformError::invalid_input(format!(
                "Invalid {name}: '{other}' is not a boolean"
            ))),
        },
        None => Ok(false),
    }
}
