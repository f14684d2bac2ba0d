//! Persisted session tokens
//!
//! The only state the client keeps across runs is the access/refresh token
//! pair, stored under the fixed keys [`ACCESS_TOKEN_KEY`] and
//! [`REFRESH_TOKEN_KEY`]. Absence of an access token means "logged out".
//!
//! Storage goes through the [`TokenRepository`] trait so that the session
//! store and the HTTP transport can share one backend:
//!
//! - [`file::FileTokenStore`] -- JSON file in the user's data directory
//!   (default).
//! - [`keychain::KeyringTokenStore`] -- OS native credential store.
//! - [`memory::MemoryTokenStore`] -- process-local, for tests and
//!   ephemeral runs.
//!
//! Clearing is idempotent on every backend, so the session store and the
//! transport may both clear without coordinating.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;

pub mod file;
pub mod keychain;
pub mod memory;

pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;
pub use memory::MemoryTokenStore;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The persisted token pair.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// `true` when neither token is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |t: &Option<String>| t.as_ref().map(|_| "<redacted>");
        f.debug_struct("TokenPair")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .finish()
    }
}

/// Durable key-value storage for the token pair.
///
/// Implementations must be cheap to call: the HTTP transport loads the pair
/// before every request.
pub trait TokenRepository: Send + Sync + std::fmt::Debug {
    /// Loads the stored pair. Missing entries are `None`, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<TokenPair>;

    /// Replaces the stored pair. `None` fields are removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// Removes both tokens. A no-op when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn clear(&self) -> Result<()>;
}

/// Opens the repository selected by `config`.
///
/// # Errors
///
/// Returns [`crate::error::TaskdeckError::Storage`] when the file backend
/// cannot determine a data directory.
pub fn open(config: &StorageConfig) -> Result<Arc<dyn TokenRepository>> {
    let repository: Arc<dyn TokenRepository> = match config.backend {
        StorageBackend::File => match &config.path {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(FileTokenStore::in_data_dir()?),
        },
        StorageBackend::Keyring => Arc::new(KeyringTokenStore::new()),
        StorageBackend::Memory => Arc::new(MemoryTokenStore::new()),
    };
    tracing::debug!("Opened token storage: {:?}", repository);
    Ok(repository)
}
