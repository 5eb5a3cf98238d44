//! Filesystem emulation of the object bucket
//!
//! Keys map 1:1 onto paths below a root directory. A key is split on `/`
//! and every segment must be a plain name: empty, `.` and `..` segments are
//! refused so no two keys share a file. Unlike the bucket, deleting a key
//! that was never written is an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::ObjectStore;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` below the root.
    ///
    /// Only plain path segments are allowed, so a key can never name a file
    /// outside the root.
    pub fn object_path(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if matches!(segment, "" | "." | "..") || segment.contains('\0') {
                return Err(Error::InvalidKey(key.to_owned()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &body).await?;
        debug!(?path, bytes = body.len(), ?content_type, "wrote object file");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(?path, "removed object file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(key.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_creates_parents() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        store
            .put("users/42/banner.jpg", Bytes::from_static(b"jpeg"), Some("image/jpeg"))
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("users/42/banner.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn test_put_overwrites_silently() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        store.put("a.css", Bytes::from_static(b"old"), None).await.unwrap();
        store.put("a.css", Bytes::from_static(b"new"), None).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.css")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        store.put("x/y.txt", Bytes::from_static(b"hello"), None).await.unwrap();
        store.delete("x/y.txt").await.unwrap();

        assert!(!dir.path().join("x/y.txt").exists());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        let err = store.delete("never/written").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref k) if k == "never/written"));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        let store = FilesystemStore::new(&root);

        for key in ["../escape.txt", "a/../../escape.txt", "/etc/passwd", "", "."] {
            let err = store
                .put(key, Bytes::from_static(b"x"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidKey(_)), "key {:?} accepted", key);
        }
        assert!(!dir.path().join("escape.txt").exists());
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_rejects_keys_that_would_alias() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        for key in ["a//b", "a/./b", "dir/", "./a", "a/."] {
            let err = store
                .put(key, Bytes::from_static(b"x"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidKey(_)), "key {:?} accepted", key);
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

            let err = store.delete(key).await.unwrap_err();
            assert!(matches!(err, Error::InvalidKey(_)), "key {:?} accepted", key);
        }
        assert!(!dir.path().join("a").exists());
        assert!(!dir.path().join("dir").exists());

        store.put("a/b", Bytes::from_static(b"x"), None).await.unwrap();
        assert_eq!(
            store.object_path("a/b").unwrap(),
            dir.path().join("a").join("b")
        );
    }

    #[tokio::test]
    async fn test_write_failure_surfaces() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemStore::new(dir.path());

        // A file where a directory is needed
        std::fs::write(dir.path().join("blocker"), b"").unwrap();
        let err = store
            .put("blocker/child", Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_backend_failure());
    }
}
