//! In-memory backend used by tests and when no directory is writable.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{self, BoxFuture};

use super::{SessionStore, validate_key};
use crate::dao::storage::StorageResult;

/// Process-local store; clones share the same entries.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let result = validate_key(key)
            .map(|()| self.entries.get(key).map(|entry| entry.value().clone()));
        Box::pin(future::ready(result))
    }

    fn put(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        let result = validate_key(key).map(|()| {
            self.entries.insert(key.to_owned(), value);
        });
        Box::pin(future::ready(result))
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let result = validate_key(key).map(|()| {
            self.entries.remove(key);
        });
        Box::pin(future::ready(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemorySessionStore::new();
        let other = store.clone();

        store.put("game_2026-01-19", "{}".into()).await.unwrap();
        assert_eq!(other.get("game_2026-01-19").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(other.len(), 1);

        other.remove("game_2026-01-19").await.unwrap();
        assert!(store.is_empty());
    }
}
