//! Durable token persistence for Authgate.
//!
//! The session coordinator remembers the last-known access token across
//! restarts. Where that lives is a deployment decision, so this crate
//! splits the concern in two:
//!
//! 1. **Backends** ([`KeyValueStore`]): raw string key/value storage, with
//!    [`MemoryStore`], [`FileStore`] and [`UnavailableStore`].
//! 2. **The token slot** ([`TokenStore`]): owns the one key Authgate uses
//!    and turns every backend failure into a logged no-op. Losing the
//!    storage layer never breaks a session that already works in memory.

mod backend;
mod error;
mod file;

pub use backend::{KeyValueStore, MemoryStore, UnavailableStore};
pub use error::StoreError;
pub use file::FileStore;

use std::sync::Arc;

/// Default key the access token is stored under.
pub const DEFAULT_TOKEN_KEY: &str = "authgate.access_token";

/// The persisted "last access token" slot.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl TokenStore {
    /// Wraps a backend, storing the token under `key`.
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// An in-memory slot under the default key.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_TOKEN_KEY)
    }

    /// The key this slot writes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored token, or `None` if absent or unreadable.
    pub fn get(&self) -> Option<String> {
        match self.backend.get(&self.key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "token read failed");
                None
            }
        }
    }

    /// Stores `token`. Failures are logged and swallowed.
    pub fn set(&self, token: &str) {
        if let Err(e) = self.backend.set(&self.key, token) {
            tracing::warn!(key = %self.key, error = %e, "token write failed, continuing in memory");
        }
    }

    /// Removes the stored token. Failures are logged and swallowed.
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "token removal failed");
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_returns_token() {
        let store = TokenStore::in_memory();

        store.set("tok-1");

        assert_eq!(store.get(), Some("tok-1".to_string()));
    }

    #[test]
    fn test_clear_removes_token() {
        let store = TokenStore::in_memory();
        store.set("tok-1");

        store.clear();

        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_unavailable_backend_degrades_to_noop() {
        let store = TokenStore::new(Arc::new(UnavailableStore), "k");

        // None of these may panic or surface an error.
        store.set("tok-1");
        assert_eq!(store.get(), None);
        store.clear();
    }

    #[test]
    fn test_clones_share_backend() {
        let a = TokenStore::in_memory();
        let b = a.clone();

        a.set("shared");

        assert_eq!(b.get(), Some("shared".to_string()));
        assert_eq!(b.key(), DEFAULT_TOKEN_KEY);
    }
}
