// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::content::{Blob, Content};
use crate::error::Result;
use crate::folder::Entry;
use crate::id::{BindId, NodeId};
use crate::node::NodeKind;
use crate::snapshot::NodeRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Storage substrate contract: one implementation per physical medium.
///
/// Implementations are pure storage. Handles, watchers and persist
/// scheduling live in [`crate::FS`]. Every compound mutation (renumber
/// siblings then insert, cascade delete, ...) must be applied atomically;
/// relational substrates wrap each call in one transaction.
///
/// Lookups of unknown ids return `None` or an empty list. Mutations that
/// target a missing node fail with `Error::NodeNotFound`, and mutations of
/// the wrong kind fail with `Error::NotAFolder` / `Error::NotAFile`.
///
/// The layer is single-writer: callers serialize mutating calls.
/// Implementations may block the calling task inside a method (embedded
/// engines do), so drive them from a multi-threaded runtime when other work
/// must progress meanwhile.
#[async_trait]
pub trait PersistenceLayer: Send + Sync {
    /// Downcast support for accessing concrete implementation methods
    fn as_any(&self) -> &dyn std::any::Any;

    // Node rows

    async fn create_node(&self, id: &NodeId, kind: NodeKind, media_type: Option<&str>)
    -> Result<()>;

    /// Remove a node; folders cascade to their children. Entries elsewhere
    /// that point at removed nodes are left in place. Returns every node id
    /// that was removed.
    async fn destroy_node(&self, id: &NodeId) -> Result<Vec<NodeId>>;

    async fn node_kind(&self, id: &NodeId) -> Result<Option<NodeKind>>;

    /// Bytes held by files: serialized inline content plus blob payloads
    async fn total_size(&self) -> Result<u64>;

    // Folder rows

    /// Entries in index order
    async fn list_entries(&self, folder: &NodeId) -> Result<Vec<Entry>>;

    /// Insert at `index` (append when `None` or past the end) and return the
    /// index actually used. Siblings at and after it shift by one.
    async fn insert_entry(&self, folder: &NodeId, entry: &Entry, index: Option<usize>)
    -> Result<usize>;

    /// Remove the given binds and renumber the rest to 0..n-1. Returns the
    /// binds that were present, in request order.
    async fn remove_entries(&self, folder: &NodeId, binds: &[BindId]) -> Result<Vec<BindId>>;

    /// `false` when the bind is not in the folder
    async fn rename_entry(&self, folder: &NodeId, bind: &BindId, name: &str) -> Result<bool>;

    /// Move one entry, keeping its bind id, into `to` (which may equal
    /// `from`). Returns the destination index, or `None` when the bind is
    /// not in `from`.
    async fn move_entry(
        &self,
        from: &NodeId,
        bind: &BindId,
        to: &NodeId,
        index: Option<usize>,
    ) -> Result<Option<usize>>;

    async fn get_entry(&self, folder: &NodeId, bind: &BindId) -> Result<Option<Entry>> {
        Ok(self
            .list_entries(folder)
            .await?
            .into_iter()
            .find(|e| &e.bind_id == bind))
    }

    async fn entries_by_name(&self, folder: &NodeId, name: &str) -> Result<Vec<Entry>> {
        Ok(self
            .list_entries(folder)
            .await?
            .into_iter()
            .filter(|e| e.name == name)
            .collect())
    }

    async fn binds_for_node(&self, folder: &NodeId, node: &NodeId) -> Result<Vec<BindId>> {
        Ok(self
            .list_entries(folder)
            .await?
            .into_iter()
            .filter(|e| &e.node_id == node)
            .map(|e| e.bind_id)
            .collect())
    }

    async fn attributes(&self, id: &NodeId) -> Result<BTreeMap<String, String>>;

    /// `None` removes the key
    async fn set_attribute(&self, id: &NodeId, key: &str, value: Option<&str>) -> Result<()>;

    // File rows

    async fn read_content(&self, file: &NodeId) -> Result<Option<Content>>;

    /// Store inline content, dropping any blob
    async fn write_content(&self, file: &NodeId, content: &Content) -> Result<()>;

    async fn read_blob(&self, file: &NodeId) -> Result<Option<Blob>>;

    /// Store a blob, dropping any inline content
    async fn write_blob(&self, file: &NodeId, blob: &Blob) -> Result<()>;

    async fn media_type(&self, file: &NodeId) -> Result<Option<String>>;

    // Snapshot seams

    /// Every node id, in id order
    async fn node_ids(&self) -> Result<Vec<NodeId>>;

    /// Up to `limit` node ids greater than `after`, in id order. Lets a
    /// caller walk every node a page at a time.
    async fn node_ids_after(&self, after: Option<&NodeId>, limit: usize) -> Result<Vec<NodeId>> {
        Ok(self
            .node_ids()
            .await?
            .into_iter()
            .filter(|id| after.is_none_or(|after| id > after))
            .take(limit)
            .collect())
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.node_ids().await?.len())
    }

    /// One node row merged with its file payload or ordered children
    async fn export_node(&self, id: &NodeId) -> Result<Option<NodeRecord>>;

    /// Remove every row and blob
    async fn clear(&self) -> Result<()>;

    /// Write the batch's blobs, then insert its rows atomically. Blob writes
    /// are not covered by the row transaction.
    async fn import_batch(&self, batch: Vec<NodeRecord>) -> Result<()>;

    /// Flush working state to the durable medium
    async fn persist(&self) -> Result<()>;
}
