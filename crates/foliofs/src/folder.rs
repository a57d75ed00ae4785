// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::fs::FS;
use crate::id::{BindId, NodeId};
use crate::node::{Node, NodeKind};
use crate::watch::{Change, WatchHandle, Watcher};
use diagnostics::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One link inside a folder's ordered child list.
///
/// Serialized as the tuple `[bindId, name, childId]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(BindId, String, NodeId)", into = "(BindId, String, NodeId)")]
pub struct Entry {
    pub bind_id: BindId,
    pub name: String,
    pub node_id: NodeId,
}

impl Entry {
    pub fn new<S: Into<String>>(bind_id: BindId, name: S, node_id: NodeId) -> Self {
        Self {
            bind_id,
            name: name.into(),
            node_id,
        }
    }
}

impl From<(BindId, String, NodeId)> for Entry {
    fn from((bind_id, name, node_id): (BindId, String, NodeId)) -> Self {
        Self {
            bind_id,
            name,
            node_id,
        }
    }
}

impl From<Entry> for (BindId, String, NodeId) {
    fn from(e: Entry) -> Self {
        (e.bind_id, e.name, e.node_id)
    }
}

/// Folder capability of a node: an ordered list of entries plus a small
/// attribute map.
///
/// Names are not keys. A folder may hold several entries with the same
/// name, and several entries for the same node; the [`BindId`] is the only
/// unambiguous handle for one link.
#[derive(Clone, Debug)]
pub struct Folder {
    id: NodeId,
    fs: FS,
}

impl Folder {
    pub(crate) fn new(id: NodeId, fs: FS) -> Self {
        Self { id, fs }
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn fs(&self) -> &FS {
        &self.fs
    }

    #[must_use]
    pub fn node(&self) -> Node {
        Node::new(self.id.clone(), NodeKind::Folder, self.fs.clone())
    }

    /// Entries in order; empty when the folder no longer exists
    pub async fn list(&self) -> Result<Vec<Entry>> {
        self.fs.persistence().list_entries(&self.id).await
    }

    /// Append a link to `node_id`
    pub async fn link(&self, name: &str, node_id: &NodeId) -> Result<BindId> {
        self.insert(name, node_id, None).await
    }

    /// Link `node_id` at `index`; `None` or an index past the end appends
    pub async fn insert(&self, name: &str, node_id: &NodeId, index: Option<usize>) -> Result<BindId> {
        let entry = Entry::new(BindId::generate(), name, node_id.clone());
        let index = self
            .fs
            .persistence()
            .insert_entry(&self.id, &entry, index)
            .await?;

        debug!("Inserted {name} as {bind_id} at {index} in {folder}",
               name, bind_id: entry.bind_id.as_str(), index, folder: self.id.as_str());
        self.fs.notify(
            &self.id,
            Change::Inserted {
                bind_id: &entry.bind_id,
                index,
                source_parent: None,
            },
        );
        self.fs.flush().await?;
        Ok(entry.bind_id)
    }

    /// `false` when the bind is not in this folder
    pub async fn unlink(&self, bind_id: &BindId) -> Result<bool> {
        let removed = self.unlinkv(std::slice::from_ref(bind_id)).await?;
        Ok(!removed.is_empty())
    }

    /// Remove several binds in one step; watchers hear one `deleted` per
    /// bind actually removed.
    pub async fn unlinkv(&self, bind_ids: &[BindId]) -> Result<Vec<BindId>> {
        if bind_ids.is_empty() {
            return Ok(Vec::new());
        }
        let removed = self
            .fs
            .persistence()
            .remove_entries(&self.id, bind_ids)
            .await?;
        if removed.is_empty() {
            return Ok(removed);
        }

        let count = removed.len();
        debug!("Unlinked {count} entries from {folder}", count, folder: self.id.as_str());
        for bind_id in &removed {
            self.fs.notify(&self.id, Change::Deleted(bind_id));
        }
        self.fs.flush().await?;
        Ok(removed)
    }

    /// `false` when the bind is not in this folder
    pub async fn rename(&self, bind_id: &BindId, new_name: &str) -> Result<bool> {
        let renamed = self
            .fs
            .persistence()
            .rename_entry(&self.id, bind_id, new_name)
            .await?;
        if renamed {
            self.fs
                .notify(&self.id, Change::Renamed(bind_id, new_name));
            self.fs.flush().await?;
        }
        Ok(renamed)
    }

    /// Move an entry to `index` in `destination` (which may be this folder),
    /// keeping its bind id. Returns the new index, or `None` when the bind
    /// is not in this folder.
    pub async fn move_entry(
        &self,
        bind_id: &BindId,
        destination: &Folder,
        index: Option<usize>,
    ) -> Result<Option<usize>> {
        let Some(index) = self
            .fs
            .persistence()
            .move_entry(&self.id, bind_id, &destination.id, index)
            .await?
        else {
            return Ok(None);
        };

        self.fs.notify(&self.id, Change::Deleted(bind_id));
        destination.fs.notify(
            &destination.id,
            Change::Inserted {
                bind_id,
                index,
                source_parent: Some(&self.id),
            },
        );
        self.fs.flush().await?;
        Ok(Some(index))
    }

    pub async fn get_entry(&self, bind_id: &BindId) -> Result<Option<Entry>> {
        self.fs.persistence().get_entry(&self.id, bind_id).await
    }

    /// First entry with `name`. Names are not unique, so this is ambiguous
    /// whenever siblings share a name; use a [`BindId`] to address one link.
    pub async fn get_entry_by_name(&self, name: &str) -> Result<Option<Entry>> {
        Ok(self
            .fs
            .persistence()
            .entries_by_name(&self.id, name)
            .await?
            .into_iter()
            .next())
    }

    pub async fn get_entries_by_name(&self, name: &str) -> Result<Vec<Entry>> {
        self.fs.persistence().entries_by_name(&self.id, name).await
    }

    /// First bind of `node_id` in this folder
    pub async fn get_bind_id(&self, node_id: &NodeId) -> Result<Option<BindId>> {
        Ok(self.get_bind_ids(node_id).await?.into_iter().next())
    }

    /// Every bind of `node_id` in this folder, in entry order
    pub async fn get_bind_ids(&self, node_id: &NodeId) -> Result<Vec<BindId>> {
        self.fs
            .persistence()
            .binds_for_node(&self.id, node_id)
            .await
    }

    pub async fn set_attribute(&self, key: &str, value: &str) -> Result<()> {
        self.fs
            .persistence()
            .set_attribute(&self.id, key, Some(value))
            .await?;
        self.fs.flush().await
    }

    pub async fn remove_attribute(&self, key: &str) -> Result<()> {
        self.fs
            .persistence()
            .set_attribute(&self.id, key, None)
            .await?;
        self.fs.flush().await
    }

    pub async fn get_attribute(&self, key: &str) -> Result<Option<String>> {
        Ok(self.attributes().await?.remove(key))
    }

    pub async fn attributes(&self) -> Result<BTreeMap<String, String>> {
        self.fs.persistence().attributes(&self.id).await
    }

    pub fn watch(&self, watcher: Arc<dyn Watcher>) -> WatchHandle {
        self.fs.watch(&self.id, watcher)
    }

    pub fn unwatch(&self, handle: &WatchHandle) -> bool {
        self.fs.unwatch(handle)
    }
}

impl PartialEq for Folder {
    fn eq(&self, other: &Folder) -> bool {
        self.id == other.id && self.fs == other.fs
    }
}
