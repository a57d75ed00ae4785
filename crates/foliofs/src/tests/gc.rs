use crate::content::Content;
use crate::error::Result;
use crate::file::File;
use crate::gc::{
    ContentScanWalker, DocumentWalker, collect_garbage, purge_collected_garbage,
    repair_dangling_entries,
};
use crate::id::NodeId;
use crate::memory::new_fs;
use crate::reserved::ReservedSlot;
use crate::testing::{build_gc_scenario, sample_blob, slot};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeSet;

fn set<const N: usize>(ids: [&NodeId; N]) -> BTreeSet<NodeId> {
    ids.into_iter().cloned().collect()
}

#[tokio::test]
async fn test_stray_is_exactly_unreferenced() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();
    let [x, y, z] = &s.attachments;

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.documents, s.documents.iter().cloned().collect::<BTreeSet<_>>());
    assert_eq!(report.used_attachments, set([x, y, z]));
    assert_eq!(report.all_attachments, set([x, y, z, &s.unreferenced]));
    assert_eq!(report.stray_attachments, set([&s.unreferenced]));

    let stats = purge_collected_garbage(&fs, &report).await.unwrap();
    assert_eq!(stats.destroyed, 1);
    assert_eq!(stats.unlinked, 1);

    assert!(fs.get_node(&s.unreferenced).await.unwrap().is_none());
    let images = s.images.list().await.unwrap();
    assert!(images.iter().all(|e| e.node_id != s.unreferenced));
    for id in [x, y, z] {
        assert!(fs.get_node(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_deleted_document_releases_attachment() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();
    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    _ = purge_collected_garbage(&fs, &report).await.unwrap();

    _ = fs.destroy_node(&s.documents[1]).await.unwrap();
    assert!(s.cabinet.unlink(&s.document_binds[1]).await.unwrap());

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.stray_attachments, set([&s.attachments[1]]));
}

#[tokio::test]
async fn test_second_run_is_empty() {
    let fs = new_fs().await.unwrap();
    _ = build_gc_scenario(&fs).await.unwrap();
    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    _ = purge_collected_garbage(&fs, &report).await.unwrap();

    let again = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert!(again.stray_attachments.is_empty());
    assert!(again.repair.unlinked.is_empty());
}

#[tokio::test]
async fn test_repair_unlinks_dangling_entries() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();

    // Destroy D2 without unlinking it
    _ = fs.destroy_node(&s.documents[1]).await.unwrap();
    assert_eq!(s.cabinet.list().await.unwrap().len(), 3);

    let report = repair_dangling_entries(&fs, &[ReservedSlot::Cabinet])
        .await
        .unwrap();
    assert_eq!(report.folders_scanned, 1);
    assert_eq!(report.unlinked.len(), 1);
    assert_eq!(report.unlinked[0].folder, *s.cabinet.id());
    assert_eq!(report.unlinked[0].entry.bind_id, s.document_binds[1]);
    assert_eq!(s.cabinet.list().await.unwrap().len(), 2);

    let again = repair_dangling_entries(&fs, &[ReservedSlot::Cabinet])
        .await
        .unwrap();
    assert!(again.unlinked.is_empty());
}

#[tokio::test]
async fn test_collect_repairs_first() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();
    _ = fs.destroy_node(&s.documents[1]).await.unwrap();

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.repair.unlinked.len(), 1);
    assert_eq!(report.documents.len(), 2);
    assert_eq!(
        report.stray_attachments,
        set([&s.attachments[1], &s.unreferenced])
    );
}

#[tokio::test]
async fn test_nested_folders_and_cycles() {
    let fs = new_fs().await.unwrap();
    let desktop = slot(&fs, ReservedSlot::Desktop).await.unwrap();
    let materials = slot(&fs, ReservedSlot::Materials).await.unwrap();

    let texture = fs.create_file(None).await.unwrap();
    texture
        .write_blob(&sample_blob("image/webp", 5, 16))
        .await
        .unwrap();
    let pack = fs.create_folder().await.unwrap();
    _ = materials.link("pack", pack.id()).await.unwrap();
    _ = pack.link("texture", texture.id()).await.unwrap();

    let unused = fs.create_file(None).await.unwrap();
    _ = pack.link("unused", unused.id()).await.unwrap();

    // A folder that contains itself
    let project = fs.create_folder().await.unwrap();
    _ = desktop.link("project", project.id()).await.unwrap();
    _ = project.link("self", project.id()).await.unwrap();
    let doc = fs.create_file(None).await.unwrap();
    doc.write(&Content::object([(
        "material",
        Content::from(texture.id().as_str()),
    )]))
    .await
    .unwrap();
    _ = project.link("doc", doc.id()).await.unwrap();

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.documents, set([doc.id()]));
    assert_eq!(report.all_attachments, set([texture.id(), unused.id()]));
    assert!(!report.all_attachments.contains(pack.id()));
    assert_eq!(report.stray_attachments, set([unused.id()]));

    let stats = purge_collected_garbage(&fs, &report).await.unwrap();
    assert_eq!(stats.destroyed, 1);
    // Unlinked from the sub-folder it was found in
    assert_eq!(stats.unlinked, 1);
    assert_eq!(pack.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_multiple_binds_all_unlinked() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();
    _ = s.images.link("w-copy.png", &s.unreferenced).await.unwrap();

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.all_attachments.len(), 4);
    let stats = purge_collected_garbage(&fs, &report).await.unwrap();
    assert_eq!(stats.unlinked, 2);
    assert_eq!(s.images.list().await.unwrap().len(), 3);
}

/// Walker reporting a fixed reference for every document
struct Fixed(NodeId);

impl DocumentWalker for Fixed {
    fn dry_walk<'a>(&'a self, _file: &'a File) -> BoxStream<'a, Result<NodeId>> {
        stream::iter([Ok(self.0.clone())]).boxed()
    }
}

#[tokio::test]
async fn test_custom_walker_decides_reachability() {
    let fs = new_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();
    let report = collect_garbage(&fs, &Fixed(s.unreferenced.clone()))
        .await
        .unwrap();
    assert_eq!(report.used_attachments, set([&s.unreferenced]));
    assert_eq!(report.stray_attachments, s.attachments.iter().cloned().collect::<BTreeSet<_>>());
}

#[tokio::test]
async fn test_gc_without_reserved_folders() {
    let fs = new_fs().await.unwrap();
    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert!(report.documents.is_empty());
    assert!(report.stray_attachments.is_empty());
}
