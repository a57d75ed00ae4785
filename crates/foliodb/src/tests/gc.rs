use crate::{BlobStore, DuckPersistence, open_memory_fs};
use foliofs::gc::{ContentScanWalker, collect_garbage, purge_collected_garbage};
use foliofs::testing::build_gc_scenario;
use std::collections::BTreeSet;

#[tokio::test]
async fn test_gc_purges_unreferenced_attachment() {
    let fs = open_memory_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();

    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(
        report.stray_attachments,
        [s.unreferenced.clone()].into_iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(report.used_attachments.len(), 3);

    let stats = purge_collected_garbage(&fs, &report).await.unwrap();
    assert_eq!(stats.destroyed, 1);

    let duck = fs
        .persistence()
        .as_any()
        .downcast_ref::<DuckPersistence>()
        .unwrap();
    assert!(
        duck.blob_store()
            .get(&BlobStore::key(&s.unreferenced))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(duck.blob_store().keys().await.unwrap().len(), 3);
    assert_eq!(s.images.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_gc_after_document_removed() {
    let fs = open_memory_fs().await.unwrap();
    let s = build_gc_scenario(&fs).await.unwrap();

    // destroy without unlinking; collection repairs the dangling entry
    _ = fs.destroy_node(&s.documents[1]).await.unwrap();
    let report = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert_eq!(report.repair.unlinked.len(), 1);
    assert_eq!(s.cabinet.list().await.unwrap().len(), 2);
    assert!(report.stray_attachments.contains(&s.attachments[1]));
    assert!(report.stray_attachments.contains(&s.unreferenced));

    _ = purge_collected_garbage(&fs, &report).await.unwrap();
    let again = collect_garbage(&fs, &ContentScanWalker).await.unwrap();
    assert!(again.stray_attachments.is_empty());
}
