pub mod auth;
pub mod config;
pub mod history;
pub mod providers;
pub mod summarize;

use pagebrief_models::auth::CredentialStore;

/// Keyring service name for stored API keys.
pub const KEYRING_SERVICE: &str = "pagebrief";

/// Credential store used by every command: keyring first, then environment.
pub fn credential_store() -> CredentialStore {
    CredentialStore::new(KEYRING_SERVICE).with_env_fallback()
}
