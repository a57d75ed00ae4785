//! Change notification for folder contents.

use crate::id::{BindId, NodeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Receives changes to one folder's entry list.
///
/// Calls arrive synchronously, after the mutation has been committed.
pub trait Watcher: Send + Sync {
    /// `source_parent` is set only when the entry arrived by a move; it is a
    /// hint for presentation and implies nothing about ownership.
    fn inserted(&self, _bind_id: &BindId, _index: usize, _source_parent: Option<&NodeId>) {}

    fn deleted(&self, _bind_id: &BindId) {}

    fn renamed(&self, _bind_id: &BindId, _new_name: &str) {}
}

/// Token returned by `watch`, passed back to `unwatch`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchHandle {
    folder: NodeId,
    serial: u64,
}

impl WatchHandle {
    #[must_use]
    pub fn folder(&self) -> &NodeId {
        &self.folder
    }
}

/// A change to broadcast
#[derive(Debug, Clone)]
pub(crate) enum Change<'a> {
    Inserted {
        bind_id: &'a BindId,
        index: usize,
        source_parent: Option<&'a NodeId>,
    },
    Deleted(&'a BindId),
    Renamed(&'a BindId, &'a str),
}

#[derive(Default)]
pub(crate) struct WatcherRegistry {
    next: AtomicU64,
    watchers: Mutex<HashMap<NodeId, Vec<(u64, Arc<dyn Watcher>)>>>,
}

impl WatcherRegistry {
    pub(crate) fn add(&self, folder: &NodeId, watcher: Arc<dyn Watcher>) -> WatchHandle {
        let serial = self.next.fetch_add(1, Ordering::Relaxed);
        let mut map = self
            .watchers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        map.entry(folder.clone()).or_default().push((serial, watcher));
        WatchHandle {
            folder: folder.clone(),
            serial,
        }
    }

    pub(crate) fn remove(&self, handle: &WatchHandle) -> bool {
        let mut map = self
            .watchers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(list) = map.get_mut(&handle.folder) else {
            return false;
        };
        let before = list.len();
        list.retain(|(serial, _)| *serial != handle.serial);
        let removed = list.len() != before;
        if list.is_empty() {
            _ = map.remove(&handle.folder);
        }
        removed
    }

    /// Snapshot the folder's watchers, then call them without the lock held
    /// so a watcher may itself register or unregister.
    pub(crate) fn notify(&self, folder: &NodeId, change: Change<'_>) {
        let targets: Vec<Arc<dyn Watcher>> = {
            let map = self
                .watchers
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match map.get(folder) {
                Some(list) => list.iter().map(|(_, w)| w.clone()).collect(),
                None => return,
            }
        };

        for watcher in targets {
            match &change {
                Change::Inserted {
                    bind_id,
                    index,
                    source_parent,
                } => watcher.inserted(bind_id, *index, *source_parent),
                Change::Deleted(bind_id) => watcher.deleted(bind_id),
                Change::Renamed(bind_id, name) => watcher.renamed(bind_id, name),
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn count(&self, folder: &NodeId) -> usize {
        self.watchers
            .lock()
            .map(|m| m.get(folder).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}
