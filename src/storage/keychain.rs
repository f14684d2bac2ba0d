//! Token pair persisted in the OS keyring
//!
//! Each token is a separate keyring entry under the `taskdeck` service,
//! keyed by [`ACCESS_TOKEN_KEY`] and [`REFRESH_TOKEN_KEY`] (Keychain on
//! macOS, Secret Service on Linux, Windows Credential Manager on Windows).

use super::{TokenPair, TokenRepository, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::{Result, TaskdeckError};

/// Default keyring service name.
const SERVICE_NAME: &str = "taskdeck";

/// Stateless accessor for the OS native keyring.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    /// Uses the default `taskdeck` service.
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Uses a custom service name, e.g. to keep profiles apart.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key).map_err(TaskdeckError::Keyring)?)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TaskdeckError::Keyring(e).into()),
        }
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => {
                self.entry(key)?
                    .set_password(value)
                    .map_err(TaskdeckError::Keyring)?;
                Ok(())
            }
            None => self.remove(key),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(TaskdeckError::Keyring(e).into()),
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenRepository for KeyringTokenStore {
    fn load(&self) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.read(ACCESS_TOKEN_KEY)?,
            refresh_token: self.read(REFRESH_TOKEN_KEY)?,
        })
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        self.write(ACCESS_TOKEN_KEY, tokens.access_token.as_deref())?;
        self.write(REFRESH_TOKEN_KEY, tokens.refresh_token.as_deref())
    }

    fn clear(&self) -> Result<()> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        assert_eq!(KeyringTokenStore::new().service, "taskdeck");
        assert_eq!(KeyringTokenStore::with_service("work").service, "work");
    }

    // -----------------------------------------------------------------------
    // Keyring integration tests  (require system keyring; skipped in CI)
    // -----------------------------------------------------------------------

    #[test]
    #[ignore = "requires system keyring"]
    fn test_save_load_clear_via_keyring() {
        let store = KeyringTokenStore::with_service("taskdeck-test-roundtrip");

        store.save(&TokenPair::new("access", "refresh")).expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded.access_token.as_deref(), Some("access"));
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));

        store.clear().expect("clear");
        assert!(store.load().expect("load after clear").is_empty());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_clear_is_idempotent_via_keyring() {
        let store = KeyringTokenStore::with_service("taskdeck-test-idempotent");
        store.clear().expect("first clear");
        store.clear().expect("second clear is no-op");
    }
}
