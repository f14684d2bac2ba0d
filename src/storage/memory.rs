//! Process-local token storage

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{TokenPair, TokenRepository};
use crate::error::Result;

/// Keeps the token pair in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<TokenPair>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `tokens` already stored.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenPair> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenRepository for MemoryTokenStore {
    fn load(&self) -> Result<TokenPair> {
        Ok(self.lock().clone())
    }

    fn save(&self, tokens: &TokenPair) -> Result<()> {
        *self.lock() = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = TokenPair::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tokens_then_clear() {
        let store = MemoryTokenStore::with_tokens(TokenPair::new("a", "r"));
        assert_eq!(store.load().unwrap().refresh_token.as_deref(), Some("r"));

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
