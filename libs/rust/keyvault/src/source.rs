//! Credential handles and the sources that resolve them to plaintext.
//!
//! A [`SecretHandle`] is a reference (`env:NAME`, `file:PATH`, `cmd:COMMAND`),
//! never the secret itself. [`SecretSource`] is the seam to whatever secret
//! store the caller uses; [`HandleResolver`] is the built-in implementation.

use async_trait::async_trait;
use secrecy::SecretString;
use std::{env, fmt, path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroize;

/// Handle resolution errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Handle text has no known scheme
    #[error("invalid secret handle '{0}': expected env:NAME, file:PATH or cmd:COMMAND")]
    InvalidHandle(String),

    /// Environment variable missing or not valid unicode
    #[error("environment variable {name} is unusable: {reason}")]
    Env {
        /// Variable name
        name: String,
        /// Why it could not be read
        reason: String,
    },

    /// File could not be read
    #[error("failed to read secret file {}: {source}", .path.display())]
    File {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Command failed or produced unusable output
    #[error("secret command failed: {0}")]
    Command(String),

    /// Source-specific failure
    #[error("{0}")]
    Other(String),
}

/// Reference to a secret held by a [`SecretSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretHandle {
    /// Environment variable
    Env(String),
    /// File whose content is the secret
    File(PathBuf),
    /// Shell command whose stdout is the secret
    Cmd(String),
}

impl SecretHandle {
    /// Handle for an environment variable.
    #[must_use]
    pub fn env(name: impl Into<String>) -> Self {
        Self::Env(name.into())
    }

    /// Handle for a file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Handle for a shell command.
    #[must_use]
    pub fn cmd(command: impl Into<String>) -> Self {
        Self::Cmd(command.into())
    }
}

impl FromStr for SecretHandle {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceError::InvalidHandle(s.to_string());
        let (scheme, target) = s.split_once(':').ok_or_else(invalid)?;
        if target.is_empty() {
            return Err(invalid());
        }
        match scheme {
            "env" => Ok(Self::Env(target.to_string())),
            "file" => Ok(Self::File(PathBuf::from(target))),
            "cmd" => Ok(Self::Cmd(target.to_string())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(name) => write!(f, "env:{name}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Cmd(command) => write!(f, "cmd:{command}"),
        }
    }
}

/// Capability to turn a handle into plaintext.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Resolve a handle to its plaintext value.
    async fn resolve_plaintext(&self, handle: &SecretHandle) -> Result<SecretString, SourceError>;
}

/// Resolves `env:`, `file:` and `cmd:` handles against the local process.
///
/// The environment is only read, never written.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandleResolver;

#[async_trait]
impl SecretSource for HandleResolver {
    async fn resolve_plaintext(&self, handle: &SecretHandle) -> Result<SecretString, SourceError> {
        debug!(%handle, "Resolving secret handle");
        match handle {
            SecretHandle::Env(name) => env::var(name)
                .map(SecretString::from)
                .map_err(|e| SourceError::Env {
                    name: name.clone(),
                    reason: e.to_string(),
                }),
            SecretHandle::File(path) => {
                let mut raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::File {
                        path: path.clone(),
                        source,
                    })?;
                let value = SecretString::from(trim_trailing_newline(&raw));
                raw.zeroize();
                Ok(value)
            }
            SecretHandle::Cmd(command) => run_command(command).await,
        }
    }
}

async fn run_command(command: &str) -> Result<SecretString, SourceError> {
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(std::process::Stdio::null())
        .output()
        .await
        .map_err(|e| SourceError::Command(e.to_string()))?;

    if !output.status.success() {
        let mut stdout = output.stdout;
        stdout.zeroize();
        return Err(SourceError::Command(format!("exited with {}", output.status)));
    }

    match String::from_utf8(output.stdout) {
        Ok(mut raw) => {
            let value = SecretString::from(trim_trailing_newline(&raw));
            raw.zeroize();
            Ok(value)
        }
        Err(e) => {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            Err(SourceError::Command("output is not valid UTF-8".to_string()))
        }
    }
}

fn trim_trailing_newline(value: &str) -> String {
    value
        .strip_suffix("\r\n")
        .or_else(|| value.strip_suffix('\n'))
        .unwrap_or(value)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    #[test]
    fn test_parse_handles() {
        assert_eq!(
            "env:AZURE_TENANT_ID".parse::<SecretHandle>().unwrap(),
            SecretHandle::env("AZURE_TENANT_ID")
        );
        assert_eq!(
            "file:/run/secrets/client".parse::<SecretHandle>().unwrap(),
            SecretHandle::file("/run/secrets/client")
        );
        assert_eq!(
            "cmd:pass show azure".parse::<SecretHandle>().unwrap(),
            SecretHandle::cmd("pass show azure")
        );
    }

    #[test]
    fn test_reject_unknown_handles() {
        for text in ["AZURE_TENANT_ID", "env:", "vault:path", ""] {
            assert!(
                matches!(text.parse::<SecretHandle>(), Err(SourceError::InvalidHandle(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        let handle = SecretHandle::env("AZURE_CLIENT_ID");
        assert_eq!(handle.to_string(), "env:AZURE_CLIENT_ID");
        assert_eq!(handle.to_string().parse::<SecretHandle>().unwrap(), handle);
    }

    #[test]
    fn test_trim_trailing_newline() {
        assert_eq!(trim_trailing_newline("value\n"), "value");
        assert_eq!(trim_trailing_newline("value\r\n"), "value");
        assert_eq!(trim_trailing_newline("value\n\n"), "value\n");
        assert_eq!(trim_trailing_newline("value"), "value");
    }

    #[tokio::test]
    async fn test_missing_env_fails() {
        let handle = SecretHandle::env("KEYVAULT_TEST_SURELY_UNSET_VARIABLE");
        let err = HandleResolver.resolve_plaintext(&handle).await.unwrap_err();
        assert!(matches!(err, SourceError::Env { .. }));
    }

    #[tokio::test]
    async fn test_file_handle() {
        let path = std::env::temp_dir().join(format!("keyvault-source-{}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "client-secret-value").unwrap();

        let value = HandleResolver
            .resolve_plaintext(&SecretHandle::file(&path))
            .await
            .unwrap();
        assert_eq!(value.expose_secret(), "client-secret-value");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let handle = SecretHandle::file("/nonexistent/keyvault/secret");
        let err = HandleResolver.resolve_plaintext(&handle).await.unwrap_err();
        assert!(matches!(err, SourceError::File { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cmd_handle() {
        let value = HandleResolver
            .resolve_plaintext(&SecretHandle::cmd("printf 'tenant-1234\\n'"))
            .await
            .unwrap();
        assert_eq!(value.expose_secret(), "tenant-1234");

        let err = HandleResolver
            .resolve_plaintext(&SecretHandle::cmd("exit 3"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Command(_)));
    }
}
