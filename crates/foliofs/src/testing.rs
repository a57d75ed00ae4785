//! Test fixtures shared by the storage backends.
//!
//! Every backend runs the same scenarios, so the trees and helpers live here
//! rather than in one crate's test module.

use crate::content::{Blob, Content};
use crate::error::Result;
use crate::folder::Folder;
use crate::fs::FS;
use crate::id::{BindId, NodeId};
use crate::reserved::{ReservedSlot, ensure_reserved_folders, reserved_folder};
use crate::watch::Watcher;
use std::sync::Mutex;

/// Deterministic payload of `len` bytes
#[must_use]
pub fn sample_blob(media_type: &str, seed: u8, len: usize) -> Blob {
    let data: Vec<u8> = (0..len)
        .map(|i| seed.wrapping_add((i % 251) as u8))
        .collect();
    Blob::new(media_type, data)
}

/// Folder for `slot`, provisioning the reserved set when needed
pub async fn slot(fs: &FS, slot: ReservedSlot) -> Result<Folder> {
    if let Some(folder) = reserved_folder(fs, slot).await? {
        return Ok(folder);
    }
    _ = ensure_reserved_folders(fs).await?;
    reserved_folder(fs, slot)
        .await?
        .ok_or_else(|| crate::Error::Other(format!("slot {slot} missing after provisioning")))
}

/// Ids in the tree built by [`build_sample_tree`]
#[derive(Debug, Clone)]
pub struct SampleTree {
    pub desktop: NodeId,
    pub project: NodeId,
    pub document: NodeId,
    pub nested: NodeId,
    pub image: NodeId,
    pub twice_linked: NodeId,
    pub empty_file: NodeId,
}

/// A tree exercising every storage feature: nested folders, inline content,
/// blobs at top level and nested in content, same-named siblings, a node
/// linked twice from one folder, and folder attributes.
pub async fn build_sample_tree(fs: &FS) -> Result<SampleTree> {
    _ = ensure_reserved_folders(fs).await?;
    let desktop = slot(fs, ReservedSlot::Desktop).await?;
    let images = slot(fs, ReservedSlot::Images).await?;

    let project = fs.create_folder().await?;
    _ = desktop.link("Project", project.id()).await?;
    project.set_attribute("view", "grid").await?;

    let document = fs.create_file(Some("application/json")).await?;
    document
        .write(&Content::object([
            ("title", Content::from("Chapter one")),
            ("pages", Content::from(12_i64)),
            ("draft", Content::from(true)),
        ]))
        .await?;
    _ = project.link("Chapter", document.id()).await?;

    let nested = fs.create_file(None).await?;
    nested
        .write(&Content::object([(
            "a",
            Content::object([(
                "b",
                Content::Array(vec![
                    Content::Blob(sample_blob("image/png", 1, 300)),
                    Content::from("text"),
                    Content::object([("c", Content::Blob(sample_blob("video/mp4", 7, 2048)))]),
                ]),
            )]),
        )]))
        .await?;
    _ = project.link("Chapter", nested.id()).await?;

    let image = fs.create_file(Some("image/png")).await?;
    image.write_blob(&sample_blob("image/png", 42, 4096)).await?;
    _ = images.link("cover.png", image.id()).await?;

    let twice_linked = fs.create_file(None).await?;
    twice_linked.write(&Content::from("shared")).await?;
    _ = project.link("alias", twice_linked.id()).await?;
    _ = project.link("alias", twice_linked.id()).await?;

    let empty_file = fs.create_file(None).await?;
    _ = desktop.insert("Untitled", empty_file.id(), Some(0)).await?;

    Ok(SampleTree {
        desktop: desktop.id().clone(),
        project: project.id().clone(),
        document: document.id().clone(),
        nested: nested.id().clone(),
        image: image.id().clone(),
        twice_linked: twice_linked.id().clone(),
        empty_file: empty_file.id().clone(),
    })
}

/// Panic unless `a` and `b` hold the same nodes with the same rows, entry
/// lists and payloads.
pub async fn assert_isomorphic(a: &FS, b: &FS) -> Result<()> {
    let ids_a = a.persistence().node_ids().await?;
    let ids_b = b.persistence().node_ids().await?;
    assert_eq!(ids_a, ids_b, "node id sets differ");

    for id in &ids_a {
        let ra = a.persistence().export_node(id).await?;
        let rb = b.persistence().export_node(id).await?;
        assert_eq!(ra, rb, "node {id} differs");
    }
    Ok(())
}

/// Ids in the tree built by [`build_gc_scenario`]
#[derive(Debug, Clone)]
pub struct GcScenario {
    pub cabinet: Folder,
    pub images: Folder,
    pub documents: [NodeId; 3],
    pub document_binds: [BindId; 3],
    /// `attachments[i]` is referenced by `documents[i]`
    pub attachments: [NodeId; 3],
    pub unreferenced: NodeId,
}

/// Documents D1..D3 in Cabinet referencing images X, Y, Z; Images also
/// holds an unreferenced W.
pub async fn build_gc_scenario(fs: &FS) -> Result<GcScenario> {
    let cabinet = slot(fs, ReservedSlot::Cabinet).await?;
    let images = slot(fs, ReservedSlot::Images).await?;

    let mut attachments = Vec::new();
    for (seed, name) in [(1u8, "x.png"), (2, "y.png"), (3, "z.png")] {
        let image = fs.create_file(Some("image/png")).await?;
        image.write_blob(&sample_blob("image/png", seed, 64)).await?;
        _ = images.link(name, image.id()).await?;
        attachments.push(image.id().clone());
    }

    let unreferenced = fs.create_file(Some("image/png")).await?;
    unreferenced
        .write_blob(&sample_blob("image/png", 9, 64))
        .await?;
    _ = images.link("w.png", unreferenced.id()).await?;

    let mut documents = Vec::new();
    let mut binds = Vec::new();
    for (i, attachment) in attachments.iter().enumerate() {
        let doc = fs.create_file(Some("application/json")).await?;
        doc.write(&Content::object([(
            "frames",
            Content::Array(vec![Content::object([
                ("kind", Content::from("panel")),
                ("image", Content::from(attachment.as_str())),
            ])]),
        )]))
        .await?;
        binds.push(cabinet.link(&format!("D{}", i + 1), doc.id()).await?);
        documents.push(doc.id().clone());
    }

    let [d1, d2, d3] = <[NodeId; 3]>::try_from(documents)
        .map_err(|_| crate::Error::Other("expected three documents".to_string()))?;
    let [b1, b2, b3] = <[BindId; 3]>::try_from(binds)
        .map_err(|_| crate::Error::Other("expected three binds".to_string()))?;
    let [x, y, z] = <[NodeId; 3]>::try_from(attachments)
        .map_err(|_| crate::Error::Other("expected three attachments".to_string()))?;

    Ok(GcScenario {
        cabinet,
        images,
        documents: [d1, d2, d3],
        document_binds: [b1, b2, b3],
        attachments: [x, y, z],
        unreferenced: unreferenced.id().clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Inserted {
        bind_id: BindId,
        index: usize,
        source_parent: Option<NodeId>,
    },
    Deleted(BindId),
    Renamed(BindId, String),
}

/// Watcher that records every call
#[derive(Debug, Default)]
pub struct RecordingWatcher {
    events: Mutex<Vec<WatchEvent>>,
}

impl RecordingWatcher {
    #[must_use]
    pub fn events(&self) -> Vec<WatchEvent> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: WatchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Watcher for RecordingWatcher {
    fn inserted(&self, bind_id: &BindId, index: usize, source_parent: Option<&NodeId>) {
        self.record(WatchEvent::Inserted {
            bind_id: bind_id.clone(),
            index,
            source_parent: source_parent.cloned(),
        });
    }

    fn deleted(&self, bind_id: &BindId) {
        self.record(WatchEvent::Deleted(bind_id.clone()));
    }

    fn renamed(&self, bind_id: &BindId, new_name: &str) {
        self.record(WatchEvent::Renamed(bind_id.clone(), new_name.to_string()));
    }
}
