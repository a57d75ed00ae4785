// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::content::{Blob, Content};
use crate::error::{Error, Result};
use crate::folder::Entry;
use crate::id::{BindId, NodeId};
use crate::node::NodeKind;
use crate::persistence::PersistenceLayer;
use crate::snapshot::NodeRecord;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory persistence layer for tests and ephemeral filesystems.
///
/// Clones share state, so a test can keep a handle after passing one to
/// [`crate::FS::new`].
#[derive(Clone, Default)]
pub struct MemoryPersistence(Arc<Mutex<State>>);

#[derive(Default)]
struct State {
    nodes: HashMap<NodeId, NodeRow>,

    // folder id -> entries in index order
    children: HashMap<NodeId, Vec<Entry>>,

    files: HashMap<NodeId, FileRow>,

    persist_count: usize,
}

struct NodeRow {
    kind: NodeKind,
    attributes: BTreeMap<String, String>,
}

#[derive(Default)]
struct FileRow {
    content: Option<Content>,
    blob: Option<Blob>,
    media_type: Option<String>,
}

impl MemoryPersistence {
    /// Number of persist steps performed so far
    pub async fn persist_count(&self) -> usize {
        self.0.lock().await.persist_count
    }
}

impl State {
    fn require(&self, id: &NodeId, kind: NodeKind) -> Result<()> {
        match self.nodes.get(id).map(|n| n.kind) {
            None => Err(Error::NodeNotFound(id.clone())),
            Some(k) if k == kind => Ok(()),
            Some(NodeKind::File) => Err(Error::NotAFolder(id.clone())),
            Some(NodeKind::Folder) => Err(Error::NotAFile(id.clone())),
        }
    }

    fn file_mut(&mut self, id: &NodeId) -> Result<&mut FileRow> {
        self.require(id, NodeKind::File)?;
        Ok(self.files.entry(id.clone()).or_default())
    }

    fn insert_record(&mut self, record: NodeRecord) {
        let NodeRecord {
            id,
            kind,
            attributes,
            content,
            blob,
            media_type,
            children,
        } = record;
        _ = self.nodes.insert(id.clone(), NodeRow { kind, attributes });
        match kind {
            NodeKind::Folder => {
                _ = self.files.remove(&id);
                _ = self.children.insert(id, children.unwrap_or_default());
            }
            NodeKind::File => {
                _ = self.children.remove(&id);
                let media_type = media_type.or_else(|| blob.as_ref().map(|b| b.media_type().to_string()));
                _ = self.files.insert(
                    id,
                    FileRow {
                        content,
                        blob,
                        media_type,
                    },
                );
            }
        }
    }
}

#[async_trait]
impl PersistenceLayer for MemoryPersistence {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn create_node(
        &self,
        id: &NodeId,
        kind: NodeKind,
        media_type: Option<&str>,
    ) -> Result<()> {
        let mut state = self.0.lock().await;
        if state.nodes.contains_key(id) {
            return state.require(id, kind);
        }
        _ = state.nodes.insert(
            id.clone(),
            NodeRow {
                kind,
                attributes: BTreeMap::new(),
            },
        );
        match kind {
            NodeKind::Folder => {
                _ = state.children.insert(id.clone(), Vec::new());
            }
            NodeKind::File => {
                _ = state.files.insert(
                    id.clone(),
                    FileRow {
                        media_type: media_type.map(str::to_string),
                        ..Default::default()
                    },
                );
            }
        }
        Ok(())
    }

    async fn destroy_node(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        let mut state = self.0.lock().await;
        let mut removed = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![id.clone()];

        while let Some(next) = pending.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if state.nodes.remove(&next).is_none() {
                continue;
            }
            if let Some(entries) = state.children.remove(&next) {
                pending.extend(entries.into_iter().map(|e| e.node_id));
            }
            _ = state.files.remove(&next);
            removed.push(next);
        }
        Ok(removed)
    }

    async fn node_kind(&self, id: &NodeId) -> Result<Option<NodeKind>> {
        Ok(self.0.lock().await.nodes.get(id).map(|n| n.kind))
    }

    async fn total_size(&self) -> Result<u64> {
        let state = self.0.lock().await;
        let mut total = 0u64;
        for row in state.files.values() {
            if let Some(content) = &row.content {
                total += content.to_json_string()?.len() as u64;
            }
            if let Some(blob) = &row.blob {
                total += blob.len() as u64;
            }
        }
        Ok(total)
    }

    async fn list_entries(&self, folder: &NodeId) -> Result<Vec<Entry>> {
        Ok(self
            .0
            .lock()
            .await
            .children
            .get(folder)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_entry(
        &self,
        folder: &NodeId,
        entry: &Entry,
        index: Option<usize>,
    ) -> Result<usize> {
        let mut state = self.0.lock().await;
        state.require(folder, NodeKind::Folder)?;
        let entries = state.children.entry(folder.clone()).or_default();
        let index = index.map_or(entries.len(), |i| i.min(entries.len()));
        entries.insert(index, entry.clone());
        Ok(index)
    }

    async fn remove_entries(&self, folder: &NodeId, binds: &[BindId]) -> Result<Vec<BindId>> {
        let mut state = self.0.lock().await;
        let Some(entries) = state.children.get_mut(folder) else {
            return Ok(Vec::new());
        };
        let mut removed = Vec::new();
        for bind in binds {
            if let Some(pos) = entries.iter().position(|e| &e.bind_id == bind) {
                removed.push(entries.remove(pos).bind_id);
            }
        }
        Ok(removed)
    }

    async fn rename_entry(&self, folder: &NodeId, bind: &BindId, name: &str) -> Result<bool> {
        let mut state = self.0.lock().await;
        let entry = state
            .children
            .get_mut(folder)
            .and_then(|entries| entries.iter_mut().find(|e| &e.bind_id == bind));
        Ok(match entry {
            Some(entry) => {
                entry.name = name.to_string();
                true
            }
            None => false,
        })
    }

    async fn move_entry(
        &self,
        from: &NodeId,
        bind: &BindId,
        to: &NodeId,
        index: Option<usize>,
    ) -> Result<Option<usize>> {
        let mut state = self.0.lock().await;
        let Some(pos) = state
            .children
            .get(from)
            .and_then(|entries| entries.iter().position(|e| &e.bind_id == bind))
        else {
            return Ok(None);
        };
        state.require(to, NodeKind::Folder)?;

        let entry = state
            .children
            .get_mut(from)
            .map(|entries| entries.remove(pos))
            .ok_or_else(|| Error::NodeNotFound(from.clone()))?;
        let dest = state.children.entry(to.clone()).or_default();
        let index = index.map_or(dest.len(), |i| i.min(dest.len()));
        dest.insert(index, entry);
        Ok(Some(index))
    }

    async fn attributes(&self, id: &NodeId) -> Result<BTreeMap<String, String>> {
        Ok(self
            .0
            .lock()
            .await
            .nodes
            .get(id)
            .map(|n| n.attributes.clone())
            .unwrap_or_default())
    }

    async fn set_attribute(&self, id: &NodeId, key: &str, value: Option<&str>) -> Result<()> {
        let mut state = self.0.lock().await;
        let row = state
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        match value {
            Some(value) => {
                _ = row.attributes.insert(key.to_string(), value.to_string());
            }
            None => {
                _ = row.attributes.remove(key);
            }
        }
        Ok(())
    }

    async fn read_content(&self, file: &NodeId) -> Result<Option<Content>> {
        Ok(self
            .0
            .lock()
            .await
            .files
            .get(file)
            .and_then(|row| row.content.clone()))
    }

    async fn write_content(&self, file: &NodeId, content: &Content) -> Result<()> {
        let mut state = self.0.lock().await;
        let row = state.file_mut(file)?;
        row.content = Some(content.clone());
        row.blob = None;
        Ok(())
    }

    async fn read_blob(&self, file: &NodeId) -> Result<Option<Blob>> {
        Ok(self
            .0
            .lock()
            .await
            .files
            .get(file)
            .and_then(|row| row.blob.clone()))
    }

    async fn write_blob(&self, file: &NodeId, blob: &Blob) -> Result<()> {
        let mut state = self.0.lock().await;
        let row = state.file_mut(file)?;
        row.blob = Some(blob.clone());
        row.content = None;
        row.media_type = Some(blob.media_type().to_string());
        Ok(())
    }

    async fn media_type(&self, file: &NodeId) -> Result<Option<String>> {
        Ok(self
            .0
            .lock()
            .await
            .files
            .get(file)
            .and_then(|row| row.media_type.clone()))
    }

    async fn node_ids(&self) -> Result<Vec<NodeId>> {
        let mut ids: Vec<NodeId> = self.0.lock().await.nodes.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn node_ids_after(&self, after: Option<&NodeId>, limit: usize) -> Result<Vec<NodeId>> {
        let mut ids: Vec<NodeId> = self
            .0
            .lock()
            .await
            .nodes
            .keys()
            .filter(|id| after.is_none_or(|after| *id > after))
            .cloned()
            .collect();
        ids.sort();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.0.lock().await.nodes.len())
    }

    async fn export_node(&self, id: &NodeId) -> Result<Option<NodeRecord>> {
        let state = self.0.lock().await;
        let Some(row) = state.nodes.get(id) else {
            return Ok(None);
        };
        Ok(Some(match row.kind {
            NodeKind::Folder => NodeRecord::folder(
                id.clone(),
                row.attributes.clone(),
                state.children.get(id).cloned().unwrap_or_default(),
            ),
            NodeKind::File => {
                let file = state.files.get(id);
                NodeRecord::file(
                    id.clone(),
                    row.attributes.clone(),
                    file.and_then(|f| f.content.clone()),
                    file.and_then(|f| f.blob.clone()),
                    file.and_then(|f| f.media_type.clone()),
                )
            }
        }))
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.0.lock().await;
        state.nodes.clear();
        state.children.clear();
        state.files.clear();
        Ok(())
    }

    async fn import_batch(&self, batch: Vec<NodeRecord>) -> Result<()> {
        let mut state = self.0.lock().await;
        for record in batch {
            state.insert_record(record);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        self.0.lock().await.persist_count += 1;
        Ok(())
    }
}
