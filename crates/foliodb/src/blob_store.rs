// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use bytes::Bytes;
use diagnostics::*;
use foliofs::NodeId;
use futures::TryStreamExt;
use object_store::ObjectStore;
use object_store::memory::InMemory;
use object_store::path::Path;
use std::sync::Arc;

const BLOB_PREFIX: &str = "blobs";

/// Binary payloads, one object per node under `blobs/<node id>`.
///
/// Writes here are not covered by database transactions.
#[derive(Clone, Debug)]
pub struct BlobStore {
    store: Arc<dyn ObjectStore>,
}

impl BlobStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    #[must_use]
    pub fn key(id: &NodeId) -> Path {
        Path::from(format!("{BLOB_PREFIX}/{id}"))
    }

    pub async fn put(&self, key: &Path, data: Bytes) -> Result<()> {
        let size = data.len();
        _ = self.store.put(key, data.into()).await?;
        let location = key.to_string();
        debug!("Stored blob {location} ({size} bytes)", location: location.as_str(), size);
        Ok(())
    }

    /// `None` when the object does not exist
    pub async fn get(&self, key: &Path) -> Result<Option<Bytes>> {
        match self.store.get(key).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removing a missing object is not an error
    pub async fn delete(&self, key: &Path) -> Result<()> {
        match self.store.delete(key).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn keys(&self) -> Result<Vec<Path>> {
        let prefix = Path::from(BLOB_PREFIX);
        let metas: Vec<_> = self.store.list(Some(&prefix)).try_collect().await?;
        Ok(metas.into_iter().map(|m| m.location).collect())
    }

    /// Remove every blob; returns how many were removed
    pub async fn clear(&self) -> Result<usize> {
        let keys = self.keys().await?;
        for key in &keys {
            self.delete(key).await?;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let blobs = BlobStore::in_memory();
        let id = NodeId::generate();
        let key = BlobStore::key(&id);
        assert_eq!(key.to_string(), format!("blobs/{id}"));

        assert!(blobs.get(&key).await.unwrap().is_none());
        blobs.put(&key, Bytes::from_static(b"payload")).await.unwrap();
        assert_eq!(
            blobs.get(&key).await.unwrap().unwrap(),
            Bytes::from_static(b"payload")
        );

        blobs.delete(&key).await.unwrap();
        blobs.delete(&key).await.unwrap();
        assert!(blobs.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let blobs = BlobStore::in_memory();
        for _ in 0..3 {
            let key = BlobStore::key(&NodeId::generate());
            blobs.put(&key, Bytes::from_static(b"x")).await.unwrap();
        }
        assert_eq!(blobs.keys().await.unwrap().len(), 3);
        assert_eq!(blobs.clear().await.unwrap(), 3);
        assert!(blobs.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = object_store::local::LocalFileSystem::new_with_prefix(dir.path()).unwrap();
        let blobs = BlobStore::new(Arc::new(store));
        let id = NodeId::generate();
        blobs
            .put(&BlobStore::key(&id), Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert!(dir.path().join("blobs").join(id.as_str()).is_file());
    }
}
