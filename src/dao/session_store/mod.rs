/// Directory of JSON files.
pub mod file;
/// In-process map.
pub mod memory;

use crate::dao::storage::{StorageError, StorageResult};
use futures::future::BoxFuture;

pub use self::{file::FileSessionStore, memory::MemorySessionStore};

/// Key-value abstraction over the local persistence medium.
///
/// Values are opaque JSON documents; decoding is the caller's business so a
/// corrupt value never surfaces as a storage failure.
pub trait SessionStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>>;
    /// Replace the value stored under `key`.
    fn put(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete `key`; deleting a missing key succeeds.
    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>>;
}

/// Reject keys that cannot be used verbatim as file names.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey { key: key.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_restricted_to_file_safe_characters() {
        assert!(validate_key("movierush_game").is_ok());
        assert!(validate_key("game_2026-01-19").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a b").is_err());
    }
}
