//! Personal access token resolution.
//!
//! The token used to talk to the server is looked up in order:
//! 1. the `BACKSTAGE_TOKEN` environment variable
//! 2. the OS keychain entry for the server URL
//!
//! Tokens are wrapped in [`SecretString`] and never logged.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub const TOKEN_ENV_VAR: &str = "BACKSTAGE_TOKEN";

const KEYCHAIN_SERVICE: &str = "backstage";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no access token found; set BACKSTAGE_TOKEN or run `backstage login`")]
    Missing,

    #[error("keychain error: {0}")]
    Keychain(String),
}

/// OS keychain storage for per-server access tokens.
///
/// Entries live under the service name "backstage" with the server URL as
/// the account, so several servers can be configured side by side.
pub struct KeychainTokenStore {
    service_name: String,
}

impl KeychainTokenStore {
    pub fn new() -> Self {
        Self {
            service_name: KEYCHAIN_SERVICE.to_string(),
        }
    }

    fn entry(&self, server_url: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(&self.service_name, server_url)
            .map_err(|e| CredentialError::Keychain(format!("entry error: {e}")))
    }

    pub fn get(&self, server_url: &str) -> Result<Option<SecretString>, CredentialError> {
        match self.entry(server_url)?.get_password() {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Keychain(format!("get error: {e}"))),
        }
    }

    pub fn set(&self, server_url: &str, token: &SecretString) -> Result<(), CredentialError> {
        self.entry(server_url)?
            .set_password(token.expose_secret())
            .map_err(|e| CredentialError::Keychain(format!("set error: {e}")))
    }

    /// Remove the stored token. Missing entries are not an error.
    pub fn delete(&self, server_url: &str) -> Result<(), CredentialError> {
        match self.entry(server_url)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::Keychain(format!("delete error: {e}"))),
        }
    }
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the token from the environment, ignoring blank values.
pub fn token_from_env() -> Option<SecretString> {
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Resolve the access token for `server_url`.
///
/// Keychain failures are logged and treated as "not found" so that an
/// environment without a secret service still works with the env var.
pub fn resolve_token(
    keychain: &KeychainTokenStore,
    server_url: &str,
) -> Result<SecretString, CredentialError> {
    if let Some(token) = token_from_env() {
        tracing::debug!("Using access token from {TOKEN_ENV_VAR}");
        return Ok(token);
    }

    match keychain.get(server_url) {
        Ok(Some(token)) => {
            tracing::debug!(server = server_url, "Using access token from keychain");
            Ok(token)
        }
        Ok(None) => Err(CredentialError::Missing),
        Err(err) => {
            tracing::warn!(error = %err, "Keychain lookup failed");
            Err(CredentialError::Missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, "  abc123  ");
        }
        let token = token_from_env().expect("token");
        assert_eq!(token.expose_secret(), "abc123");

        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, "   ");
        }
        assert!(token_from_env().is_none());

        unsafe {
            std::env::remove_var(TOKEN_ENV_VAR);
        }
        assert!(token_from_env().is_none());
    }

    #[test]
    fn test_default_store_uses_backstage_service() {
        assert_eq!(KeychainTokenStore::default().service_name, KEYCHAIN_SERVICE);
    }

    #[test]
    fn test_missing_error_mentions_env_var() {
        assert!(CredentialError::Missing.to_string().contains(TOKEN_ENV_VAR));
    }
}
