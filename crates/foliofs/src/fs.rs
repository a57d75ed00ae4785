// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::file::File;
use crate::folder::Folder;
use crate::id::{FileSystemId, NodeId};
use crate::node::{Node, NodeKind};
use crate::persistence::PersistenceLayer;
use crate::watch::{Change, WatchHandle, Watcher, WatcherRegistry};
use diagnostics::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Filesystem handle over one storage substrate.
///
/// Cloning is cheap and every clone refers to the same instance, watcher
/// registry and persist schedule. Nodes, files and folders carry a clone so
/// their operations are self-sufficient.
///
/// There is no internal mutual exclusion between mutating calls: callers
/// funnel mutations against one instance through a single logical task.
#[derive(Clone)]
pub struct FS {
    inner: Arc<Inner>,
}

struct Inner {
    id: FileSystemId,
    persistence: Arc<dyn PersistenceLayer>,
    watchers: WatcherRegistry,
    suspended: AtomicUsize,
}

impl FS {
    /// Create a filesystem over `persistence`, provisioning the root folder
    /// when the substrate is empty.
    pub async fn new<P: PersistenceLayer + 'static>(persistence: P) -> Result<Self> {
        Self::with_persistence(Arc::new(persistence)).await
    }

    pub async fn with_persistence(persistence: Arc<dyn PersistenceLayer>) -> Result<Self> {
        let fs = FS {
            inner: Arc::new(Inner {
                id: FileSystemId::generate(),
                persistence,
                watchers: WatcherRegistry::default(),
                suspended: AtomicUsize::new(0),
            }),
        };
        fs.ensure_root().await?;
        Ok(fs)
    }

    /// Identity of this instance; stable for the life of the handle
    #[must_use]
    pub fn id(&self) -> &FileSystemId {
        &self.inner.id
    }

    #[must_use]
    pub fn persistence(&self) -> &Arc<dyn PersistenceLayer> {
        &self.inner.persistence
    }

    async fn ensure_root(&self) -> Result<()> {
        let root = NodeId::root();
        match self.persistence().node_kind(&root).await? {
            Some(NodeKind::Folder) => Ok(()),
            Some(NodeKind::File) => Err(Error::NotAFolder(root)),
            None => {
                debug!("Provisioning root folder");
                self.persistence()
                    .create_node(&root, NodeKind::Folder, None)
                    .await?;
                self.flush().await
            }
        }
    }

    pub async fn create_file(&self, media_type_hint: Option<&str>) -> Result<File> {
        self.create_file_with_id(NodeId::generate(), media_type_hint)
            .await
    }

    /// Create a file under a pre-agreed id, e.g. when importing from another
    /// backend.
    pub async fn create_file_with_id(
        &self,
        id: NodeId,
        media_type_hint: Option<&str>,
    ) -> Result<File> {
        self.persistence()
            .create_node(&id, NodeKind::File, media_type_hint)
            .await?;
        self.flush().await?;
        Ok(File::new(id, self.clone()))
    }

    pub async fn create_folder(&self) -> Result<Folder> {
        let id = NodeId::generate();
        self.persistence()
            .create_node(&id, NodeKind::Folder, None)
            .await?;
        self.flush().await?;
        Ok(Folder::new(id, self.clone()))
    }

    /// Destroy a node (folders cascade) and return every id removed.
    ///
    /// Entries that still point at removed nodes are not unlinked; see
    /// [`crate::gc::repair_dangling_entries`].
    pub async fn destroy_node(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        let removed = self.persistence().destroy_node(id).await?;
        let count = removed.len();
        debug!("Destroyed {node_id} ({count} nodes)", node_id: id.as_str(), count);
        if !removed.is_empty() {
            self.flush().await?;
        }
        Ok(removed)
    }

    pub async fn get_node(&self, id: &NodeId) -> Result<Option<Node>> {
        Ok(self
            .persistence()
            .node_kind(id)
            .await?
            .map(|kind| Node::new(id.clone(), kind, self.clone())))
    }

    pub async fn get_root(&self) -> Result<Folder> {
        self.ensure_root().await?;
        Ok(Folder::new(NodeId::root(), self.clone()))
    }

    pub async fn collect_total_size(&self) -> Result<u64> {
        self.persistence().total_size().await
    }

    pub fn watch(&self, folder: &NodeId, watcher: Arc<dyn Watcher>) -> WatchHandle {
        self.inner.watchers.add(folder, watcher)
    }

    /// `false` when the handle was not registered
    pub fn unwatch(&self, handle: &WatchHandle) -> bool {
        self.inner.watchers.remove(handle)
    }

    pub(crate) fn notify(&self, folder: &NodeId, change: Change<'_>) {
        self.inner.watchers.notify(folder, change);
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self, folder: &NodeId) -> usize {
        self.inner.watchers.count(folder)
    }

    /// Defer the per-mutation persist step until the returned guard resumes.
    ///
    /// Guards nest; the persist happens once, when the outermost resumes.
    #[must_use]
    pub fn suspend_persistence(&self) -> PersistSuspension {
        _ = self.inner.suspended.fetch_add(1, Ordering::SeqCst);
        PersistSuspension {
            fs: Some(self.clone()),
        }
    }

    #[must_use]
    pub fn is_persistence_suspended(&self) -> bool {
        self.inner.suspended.load(Ordering::SeqCst) > 0
    }

    /// Flush to the durable medium now, regardless of suspension
    pub async fn persist(&self) -> Result<()> {
        self.persistence().persist().await
    }

    /// Persist step that follows every committed mutation. A failure here
    /// is reported as [`Error::Unpersisted`]: the mutation itself stands and
    /// watchers have already been told about it.
    pub(crate) async fn flush(&self) -> Result<()> {
        if self.is_persistence_suspended() {
            return Ok(());
        }
        self.persist().await.map_err(|e| {
            let cause = e.to_string();
            warn!("Persist after committed mutation failed: {cause}", cause: cause.as_str());
            Error::Unpersisted(cause)
        })
    }

    /// True when this call released the last suspension
    fn release_suspension(&self) -> bool {
        self.inner.suspended.fetch_sub(1, Ordering::SeqCst) == 1
    }
}

/// Scope in which persist steps are deferred. See [`FS::suspend_persistence`].
pub struct PersistSuspension {
    fs: Option<FS>,
}

impl PersistSuspension {
    /// End the scope, persisting once if no other suspension is active
    pub async fn resume(mut self) -> Result<()> {
        if let Some(fs) = self.fs.take() {
            if fs.release_suspension() {
                fs.persist().await?;
            }
        }
        Ok(())
    }
}

impl Drop for PersistSuspension {
    fn drop(&mut self) {
        if let Some(fs) = self.fs.take() {
            _ = fs.release_suspension();
            warn!("Persistence suspension dropped without resume; state not flushed until the next mutation");
        }
    }
}

impl std::fmt::Debug for FS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FS{{{}}}", self.inner.id)
    }
}

impl PartialEq<FS> for FS {
    fn eq(&self, other: &FS) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
