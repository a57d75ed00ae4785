// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Mark and sweep of unreferenced attachments.
//!
//! Documents live under the Desktop, Cabinet and Trash slots; attachments
//! are the files under Images and Materials. An attachment is stray when no
//! document's [`DocumentWalker`] yields its id. Reachability comes entirely
//! from the walker, so a walker that misses a reference causes data loss.

use crate::error::Result;
use crate::file::File;
use crate::folder::{Entry, Folder};
use crate::fs::FS;
use crate::id::{BindId, NodeId};
use crate::reserved::{ReservedSlot, reserved_folder};
use async_stream::try_stream;
use diagnostics::*;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Yields the attachment ids a document references.
///
/// Implementations must not modify anything and must not load the
/// attachments themselves.
pub trait DocumentWalker: Send + Sync {
    fn dry_walk<'a>(&'a self, file: &'a File) -> BoxStream<'a, Result<NodeId>>;
}

/// Walker that treats every id-shaped string in a document's inline
/// content as a reference. It may over-retain, never under-retain, for
/// documents that name attachments by id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentScanWalker;

impl DocumentWalker for ContentScanWalker {
    fn dry_walk<'a>(&'a self, file: &'a File) -> BoxStream<'a, Result<NodeId>> {
        try_stream! {
            if let Some(content) = file.read().await? {
                let mut ids = Vec::new();
                content.for_each_str(&mut |s| {
                    if NodeId::looks_like_id(s) {
                        ids.push(NodeId::from(s));
                    }
                });
                for id in ids {
                    yield id;
                }
            }
        }
        .boxed()
    }
}

/// An entry whose target no longer resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEntry {
    pub folder: NodeId,
    pub entry: Entry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub folders_scanned: usize,
    pub unlinked: Vec<DanglingEntry>,
}

impl RepairReport {
    fn merge(&mut self, other: RepairReport) {
        self.folders_scanned += other.folders_scanned;
        self.unlinked.extend(other.unlinked);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GarbageReport {
    pub documents: BTreeSet<NodeId>,
    pub used_attachments: BTreeSet<NodeId>,
    pub all_attachments: BTreeSet<NodeId>,
    pub stray_attachments: BTreeSet<NodeId>,
    /// Folders each attachment was found in
    pub attachment_folders: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pub repair: RepairReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    pub destroyed: usize,
    pub unlinked: usize,
}

async fn slot_folders(fs: &FS, slots: &[ReservedSlot]) -> Result<Vec<Folder>> {
    let mut folders = Vec::new();
    for slot in slots {
        match reserved_folder(fs, *slot).await? {
            Some(folder) => folders.push(folder),
            None => {
                let name = slot.name();
                debug!("Reserved folder {name} is not provisioned", name);
            }
        }
    }
    Ok(folders)
}

/// Unlink every entry, under the given slots, whose target node no longer
/// exists. Sub-folders are descended; each folder is visited once.
pub async fn repair_dangling_entries(fs: &FS, slots: &[ReservedSlot]) -> Result<RepairReport> {
    let mut report = RepairReport::default();
    let mut visited = HashSet::new();
    let mut pending = slot_folders(fs, slots).await?;

    while let Some(folder) = pending.pop() {
        if !visited.insert(folder.id().clone()) {
            continue;
        }
        report.folders_scanned += 1;

        let mut dangling = Vec::new();
        for entry in folder.list().await? {
            match fs.get_node(&entry.node_id).await? {
                Some(node) => pending.extend(node.as_folder()),
                None => dangling.push(entry),
            }
        }
        if dangling.is_empty() {
            continue;
        }

        let binds: Vec<BindId> = dangling.iter().map(|e| e.bind_id.clone()).collect();
        let removed = folder.unlinkv(&binds).await?;
        for entry in dangling {
            if !removed.contains(&entry.bind_id) {
                continue;
            }
            warn!("Unlinked dangling entry {name} -> {node_id} from {folder}",
                  name: entry.name.as_str(), node_id: entry.node_id.as_str(), folder: folder.id().as_str());
            report.unlinked.push(DanglingEntry {
                folder: folder.id().clone(),
                entry,
            });
        }
    }
    Ok(report)
}

/// Every file reachable from `roots`, paired with the folder holding it
async fn files_under(fs: &FS, roots: Vec<Folder>) -> Result<Vec<(NodeId, NodeId)>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = roots;

    while let Some(folder) = pending.pop() {
        if !visited.insert(folder.id().clone()) {
            continue;
        }
        for entry in folder.list().await? {
            let Some(node) = fs.get_node(&entry.node_id).await? else {
                continue;
            };
            if let Some(sub) = node.as_folder() {
                pending.push(sub);
            } else {
                files.push((entry.node_id, folder.id().clone()));
            }
        }
    }
    Ok(files)
}

/// Compute the stray attachment set without deleting anything but
/// dangling entries.
pub async fn collect_garbage<W>(fs: &FS, walker: &W) -> Result<GarbageReport>
where
    W: DocumentWalker + ?Sized,
{
    let mut report = GarbageReport::default();

    let mut repair_slots = ReservedSlot::DOCUMENTS.to_vec();
    repair_slots.extend(ReservedSlot::ATTACHMENTS);
    report
        .repair
        .merge(repair_dangling_entries(fs, &repair_slots).await?);

    let roots = slot_folders(fs, &ReservedSlot::DOCUMENTS).await?;
    report.documents = files_under(fs, roots)
        .await?
        .into_iter()
        .map(|(file, _)| file)
        .collect();

    for document in &report.documents {
        let Some(file) = fs.get_node(document).await?.and_then(|n| n.as_file()) else {
            continue;
        };
        let mut refs = walker.dry_walk(&file);
        while let Some(id) = refs.next().await {
            _ = report.used_attachments.insert(id?);
        }
    }

    let roots = slot_folders(fs, &ReservedSlot::ATTACHMENTS).await?;
    for (file, folder) in files_under(fs, roots).await? {
        _ = report
            .attachment_folders
            .entry(file.clone())
            .or_default()
            .insert(folder);
        _ = report.all_attachments.insert(file);
    }

    report.stray_attachments = report
        .all_attachments
        .difference(&report.used_attachments)
        .cloned()
        .collect();

    let documents = report.documents.len();
    let attachments = report.all_attachments.len();
    let stray = report.stray_attachments.len();
    info!("Collected {stray} stray of {attachments} attachments across {documents} documents",
          stray, attachments, documents);
    Ok(report)
}

/// Destroy every stray attachment in `report`, then unlink all of its binds
/// from Images and from the folders it was found in.
pub async fn purge_collected_garbage(fs: &FS, report: &GarbageReport) -> Result<PurgeStats> {
    let suspension = fs.suspend_persistence();
    let stats = purge(fs, report).await;
    suspension.resume().await?;
    let stats = stats?;

    let destroyed = stats.destroyed;
    let unlinked = stats.unlinked;
    info!("Purged {destroyed} attachments, unlinked {unlinked} entries", destroyed, unlinked);
    Ok(stats)
}

async fn purge(fs: &FS, report: &GarbageReport) -> Result<PurgeStats> {
    let mut stats = PurgeStats::default();
    let images = reserved_folder(fs, ReservedSlot::Images).await?;

    for id in &report.stray_attachments {
        if !fs.destroy_node(id).await?.is_empty() {
            stats.destroyed += 1;
        }

        let mut folders: Vec<Folder> = images.iter().cloned().collect();
        if let Some(found_in) = report.attachment_folders.get(id) {
            for folder_id in found_in {
                if images.as_ref().is_some_and(|f| f.id() == folder_id) {
                    continue;
                }
                if let Some(folder) = fs.get_node(folder_id).await?.and_then(|n| n.as_folder()) {
                    folders.push(folder);
                }
            }
        }

        for folder in folders {
            let binds = folder.get_bind_ids(id).await?;
            stats.unlinked += folder.unlinkv(&binds).await?.len();
        }
    }
    Ok(stats)
}
