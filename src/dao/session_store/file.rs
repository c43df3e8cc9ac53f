//! JSON-file backend: one file per key inside a directory.

use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use super::{SessionStore, validate_key};
use crate::dao::storage::{StorageError, StorageResult};

/// Store writing each key to `<root>/<key>.json`.
#[derive(Clone)]
pub struct FileSessionStore {
    root: Arc<PathBuf>,
}

impl FileSessionStore {
    /// Open the store, creating the directory when needed.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| {
            StorageError::unavailable(format!("creating `{}`", root.display()), source)
        })?;
        debug!(path = %root.display(), "opened file session store");
        Ok(Self {
            root: Arc::new(root),
        })
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            match fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::unavailable(
                    format!("reading `{}`", path.display()),
                    err,
                )),
            }
        })
    }

    fn put(&self, key: &str, value: String) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            let staging = path.with_extension("json.tmp");
            fs::write(&staging, value).await.map_err(|source| {
                StorageError::unavailable(format!("writing `{}`", staging.display()), source)
            })?;
            fs::rename(&staging, &path).await.map_err(|source| {
                StorageError::unavailable(format!("replacing `{}`", path.display()), source)
            })
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'static, StorageResult<()>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StorageError::unavailable(
                    format!("removing `{}`", path.display()),
                    err,
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path().join("state")).await.unwrap();

        assert_eq!(store.get("movierush_game").await.unwrap(), None);

        store
            .put("movierush_game", r#"{"a":1}"#.into())
            .await
            .unwrap();
        assert_eq!(
            store.get("movierush_game").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        store.put("movierush_game", "{}".into()).await.unwrap();
        assert_eq!(store.get("movierush_game").await.unwrap().as_deref(), Some("{}"));

        store.remove("movierush_game").await.unwrap();
        store.remove("movierush_game").await.unwrap();
        assert_eq!(store.get("movierush_game").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::open(dir.path()).await.unwrap();
        let err = store.put("../escape", "{}".into()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
