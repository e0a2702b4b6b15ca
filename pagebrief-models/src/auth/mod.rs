//! API key handling.
//!
//! Keys are resolved by the calling layer (system keyring first, then
//! environment variables) and handed to the dispatcher explicitly. The
//! dispatch core never reads storage on its own.
//!
//! # Example
//!
//! ```ignore
//! use pagebrief_models::auth::CredentialStore;
//!
//! let store = CredentialStore::new("pagebrief").with_env_fallback();
//! store.set("openai", "sk-...")?;
//! let key = store.get("openai")?;
//! ```

use std::collections::BTreeSet;
use std::env;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{Error, Result};

/// A secret API key that never shows up in logs.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Parse a user-supplied key, trimming whitespace and rejecting empty input.
    pub fn parse(key: &str) -> Result<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyApiKey);
        }
        Ok(Self::new(trimmed))
    }

    /// Expose the secret key value.
    ///
    /// Only call this when building the outbound request.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Environment variable names for each provider.
const ENV_VARS: &[(&str, &str)] = &[
    ("openai", "OPENAI_API_KEY"),
    ("gemini", "GEMINI_API_KEY"),
    ("deepseek", "DEEPSEEK_API_KEY"),
];

/// Get the environment variable name for a provider.
pub fn env_var_for_provider(provider: &str) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(p, _)| *p == provider)
        .map(|(_, v)| *v)
}

/// Key–value credential storage keyed by provider id.
///
/// Lookup order: system keyring, then environment variables when
/// `env_fallback` is enabled. Writes always go to the keyring.
pub struct CredentialStore {
    service_name: String,
    env_fallback: bool,
}

impl CredentialStore {
    /// Create a store under the given keyring service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            env_fallback: false,
        }
    }

    /// Enable environment variable fallback.
    pub fn with_env_fallback(mut self) -> Self {
        self.env_fallback = true;
        self
    }

    /// Get the API key for a provider.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialsNotFound` if neither source has a key.
    pub fn get(&self, provider: &str) -> Result<ApiKey> {
        if let Some(key) = self.get_from_keyring(provider) {
            debug!(provider, "retrieved API key from keyring");
            return Ok(key);
        }

        if self.env_fallback
            && let Some(key) = self.get_from_env(provider)
        {
            debug!(provider, "retrieved API key from environment");
            return Ok(key);
        }

        Err(Error::CredentialsNotFound(provider.to_string()))
    }

    /// Store an API key in the system keyring.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyApiKey` for blank input and `Error::Keyring`
    /// if the keyring rejects the write.
    pub fn set(&self, provider: &str, key: &str) -> Result<()> {
        let key = ApiKey::parse(key)?;
        let entry = self.keyring_entry(provider)?;
        entry
            .set_password(key.expose_secret())
            .map_err(|e| Error::Keyring(e.to_string()))?;
        debug!(provider, "stored API key in keyring");
        Ok(())
    }

    /// Delete an API key from the system keyring.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialsNotFound` if nothing was stored.
    pub fn delete(&self, provider: &str) -> Result<()> {
        let entry = self.keyring_entry(provider)?;
        entry.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => Error::CredentialsNotFound(provider.to_string()),
            _ => Error::Keyring(e.to_string()),
        })?;
        debug!(provider, "deleted API key from keyring");
        Ok(())
    }

    /// List known providers that have a key in any enabled source.
    pub fn list_providers(&self) -> Vec<String> {
        let mut providers = BTreeSet::new();
        for (provider, _) in ENV_VARS {
            if self.credential_source(provider).is_some() {
                providers.insert(provider.to_string());
            }
        }
        providers.into_iter().collect()
    }

    /// Where a provider's key would be read from, if anywhere.
    pub fn credential_source(&self, provider: &str) -> Option<CredentialSource> {
        if self.get_from_keyring(provider).is_some() {
            Some(CredentialSource::Keyring)
        } else if self.env_fallback && self.get_from_env(provider).is_some() {
            Some(CredentialSource::Environment)
        } else {
            None
        }
    }

    fn keyring_entry(&self, provider: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service_name, provider).map_err(|e| Error::Keyring(e.to_string()))
    }

    fn get_from_keyring(&self, provider: &str) -> Option<ApiKey> {
        let entry = self.keyring_entry(provider).ok()?;
        entry
            .get_password()
            .ok()
            .and_then(|key| ApiKey::parse(&key).ok())
    }

    fn get_from_env(&self, provider: &str) -> Option<ApiKey> {
        let env_var = env_var_for_provider(provider)?;
        env::var(env_var).ok().and_then(|key| ApiKey::parse(&key).ok())
    }
}

/// Source of a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Keyring,
    Environment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-key-12345");
        let debug = format!("{:?}", key);
        assert_eq!(debug, "ApiKey([REDACTED])");
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn api_key_parse_trims_and_rejects_blank() {
        let key = ApiKey::parse("  sk-abc \n").unwrap();
        assert_eq!(key.expose_secret(), "sk-abc");
        assert!(matches!(ApiKey::parse("   "), Err(Error::EmptyApiKey)));
    }

    #[test]
    fn api_key_is_empty_checks_trimmed_value() {
        assert!(ApiKey::new(" ").is_empty());
        assert!(!ApiKey::new("k").is_empty());
    }

    #[test]
    fn env_var_for_known_providers() {
        assert_eq!(env_var_for_provider("openai"), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for_provider("gemini"), Some("GEMINI_API_KEY"));
        assert_eq!(env_var_for_provider("deepseek"), Some("DEEPSEEK_API_KEY"));
        assert_eq!(env_var_for_provider("unknown"), None);
    }

    #[test]
    fn credential_store_env_fallback_works() {
        // SAFETY: no other test in this crate touches DEEPSEEK_API_KEY
        unsafe { env::set_var("DEEPSEEK_API_KEY", "test-key-from-env") };

        let store = CredentialStore::new("pagebrief-test-nonexistent").with_env_fallback();
        let result = store.get("deepseek");
        let source = store.credential_source("deepseek");

        // SAFETY: see above
        unsafe { env::remove_var("DEEPSEEK_API_KEY") };

        assert_eq!(result.unwrap().expose_secret(), "test-key-from-env");
        assert_eq!(source, Some(CredentialSource::Environment));
    }

    #[test]
    fn credential_store_without_fallback_fails() {
        let store = CredentialStore::new("pagebrief-test-nonexistent");
        let result = store.get("unknown-provider");
        assert!(matches!(result, Err(Error::CredentialsNotFound(_))));
    }
}
