use crate::content::Content;
use crate::error::Error;
use crate::memory::new_fs;
use crate::snapshot::{DUMP_PAGE_SIZE, NodeRecord, RestoreOptions, dump, dump_to_writer, restore};
use crate::testing::{assert_isomorphic, build_sample_tree};
use crate::FS;
use bytes::Bytes;
use futures::{StreamExt, pin_mut};

async fn dump_bytes(fs: &FS) -> Bytes {
    let mut out = Vec::new();
    _ = dump_to_writer(fs, &mut out, |_| {}).await.unwrap();
    Bytes::from(out)
}

#[tokio::test]
async fn test_round_trip() {
    let source = new_fs().await.unwrap();
    let tree = build_sample_tree(&source).await.unwrap();
    let snapshot = dump_bytes(&source).await;

    let target = new_fs().await.unwrap();
    let stats = restore(&target, &snapshot, RestoreOptions::default(), |_| {})
        .await
        .unwrap();
    assert_eq!(
        stats.records,
        source.persistence().node_ids().await.unwrap().len()
    );
    assert_eq!(stats.batches, 1);
    assert_isomorphic(&source, &target).await.unwrap();

    let file = target
        .get_node(&tree.image)
        .await
        .unwrap()
        .unwrap()
        .as_file()
        .unwrap();
    assert_eq!(file.read_blob().await.unwrap().unwrap().len(), 4096);
}

#[tokio::test]
async fn test_batch_size_independence() {
    let source = new_fs().await.unwrap();
    _ = build_sample_tree(&source).await.unwrap();
    let snapshot = dump_bytes(&source).await;

    let one = new_fs().await.unwrap();
    let stats = restore(&one, &snapshot, RestoreOptions { batch_size: 1 }, |_| {})
        .await
        .unwrap();
    assert_eq!(stats.batches, stats.records);

    let many = new_fs().await.unwrap();
    _ = restore(&many, &snapshot, RestoreOptions { batch_size: 1000 }, |_| {})
        .await
        .unwrap();
    assert_isomorphic(&one, &many).await.unwrap();
}

#[tokio::test]
async fn test_nested_blob_fidelity() {
    let source = new_fs().await.unwrap();
    let tree = build_sample_tree(&source).await.unwrap();
    let snapshot = dump_bytes(&source).await;

    let target = new_fs().await.unwrap();
    _ = restore(&target, &snapshot, RestoreOptions::default(), |_| {})
        .await
        .unwrap();

    let read = |fs: FS| {
        let id = tree.nested.clone();
        async move {
            fs.get_node(&id)
                .await
                .unwrap()
                .unwrap()
                .as_file()
                .unwrap()
                .read()
                .await
                .unwrap()
                .unwrap()
        }
    };
    let before = read(source).await;
    let after = read(target).await;
    assert_eq!(before, after);

    let items = match after.get("a").and_then(|a| a.get("b")) {
        Some(Content::Array(items)) => items.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(items[0].as_blob().unwrap().media_type(), "image/png");
    assert_eq!(items[1], Content::from("text"));
    assert_eq!(
        items[2].get("c").unwrap().as_blob().unwrap().media_type(),
        "video/mp4"
    );
}

#[tokio::test]
async fn test_restore_replaces_existing_tree() {
    let source = new_fs().await.unwrap();
    _ = build_sample_tree(&source).await.unwrap();
    let snapshot = dump_bytes(&source).await;

    let target = new_fs().await.unwrap();
    let stale = target.create_file(None).await.unwrap();
    _ = restore(&target, &snapshot, RestoreOptions::default(), |_| {})
        .await
        .unwrap();
    assert!(target.get_node(stale.id()).await.unwrap().is_none());
    assert_isomorphic(&source, &target).await.unwrap();
}

#[tokio::test]
async fn test_order_independence() {
    let source = new_fs().await.unwrap();
    _ = build_sample_tree(&source).await.unwrap();
    let snapshot = dump_bytes(&source).await;

    let text = std::str::from_utf8(&snapshot).unwrap();
    let mut lines: Vec<&str> = text.lines().collect();
    lines.reverse();
    let reversed = Bytes::from(lines.join("\n"));

    let target = new_fs().await.unwrap();
    _ = restore(&target, &reversed, RestoreOptions { batch_size: 3 }, |_| {})
        .await
        .unwrap();
    assert_isomorphic(&source, &target).await.unwrap();
}

#[tokio::test]
async fn test_dump_is_one_record_per_line() {
    let fs = new_fs().await.unwrap();
    _ = build_sample_tree(&fs).await.unwrap();
    let ids = fs.persistence().node_ids().await.unwrap();

    let mut progress = Vec::new();
    let mut records = Vec::new();
    {
        let stream = dump(&fs, |p| progress.push(p));
        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            assert_eq!(chunk.last(), Some(&b'\n'));
            let text = std::str::from_utf8(&chunk).unwrap();
            assert_eq!(text.matches('\n').count(), 1);
            records.push(NodeRecord::from_line(records.len() + 1, text.trim_end()).unwrap());
        }
    }

    assert_eq!(records.len(), ids.len());
    assert_eq!(
        records.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
        ids
    );
    assert_eq!(progress.len(), ids.len());
    assert_eq!(progress.last().copied(), Some(1.0));
}

#[tokio::test]
async fn test_progress_and_blank_lines() {
    let source = new_fs().await.unwrap();
    let snapshot = dump_bytes(&source).await;
    let padded = Bytes::from(format!("\n{}\n\n", std::str::from_utf8(&snapshot).unwrap()));

    let target = new_fs().await.unwrap();
    let mut progress = Vec::new();
    let stats = restore(&target, &padded, RestoreOptions::default(), |p| progress.push(p))
        .await
        .unwrap();
    assert_eq!(stats.records, 1);
    assert_eq!(stats.lines, 4);
    assert_eq!(progress.last().copied(), Some(1.0));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_malformed_line_fails_with_position() {
    let fs = new_fs().await.unwrap();
    let root = NodeRecord::folder(crate::NodeId::root(), Default::default(), Vec::new());
    let text = format!("{}\nnot json\n", root.to_line().unwrap());
    let err = restore(&fs, &Bytes::from(text), RestoreOptions::default(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Format { line: 2, .. }));
}

#[tokio::test]
async fn test_restore_from_path() {
    let source = new_fs().await.unwrap();
    _ = build_sample_tree(&source).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.jsonl");
    let mut file = tokio::fs::File::create(&path).await.unwrap();
    _ = dump_to_writer(&source, &mut file, |_| {}).await.unwrap();
    drop(file);

    let target = new_fs().await.unwrap();
    _ = restore(&target, &path, RestoreOptions { batch_size: 2 }, |_| {})
        .await
        .unwrap();
    assert_isomorphic(&source, &target).await.unwrap();
}

#[tokio::test]
async fn test_node_id_pages_cover_every_node_once() {
    let fs = new_fs().await.unwrap();
    _ = build_sample_tree(&fs).await.unwrap();
    let ids = fs.persistence().node_ids().await.unwrap();
    assert_eq!(fs.persistence().node_count().await.unwrap(), ids.len());

    let mut paged = Vec::new();
    let mut after = None;
    loop {
        let page = fs
            .persistence()
            .node_ids_after(after.as_ref(), 3)
            .await
            .unwrap();
        assert!(page.len() <= 3);
        if page.is_empty() {
            break;
        }
        after = page.last().cloned();
        paged.extend(page);
    }
    assert_eq!(paged, ids);
    assert!(fs.persistence().node_ids_after(None, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dump_spans_several_pages() {
    let source = new_fs().await.unwrap();
    let root = source.get_root().await.unwrap();
    for n in 0..DUMP_PAGE_SIZE + 20 {
        let folder = source.create_folder().await.unwrap();
        _ = root.link(&format!("f{n}"), folder.id()).await.unwrap();
    }
    let total = source.persistence().node_count().await.unwrap();
    assert!(total > DUMP_PAGE_SIZE);

    let mut progress = Vec::new();
    let mut out = Vec::new();
    let stats = dump_to_writer(&source, &mut out, |p| progress.push(p))
        .await
        .unwrap();
    assert_eq!(stats.records, total);
    assert_eq!(progress.len(), total);
    assert_eq!(progress.last().copied(), Some(1.0));

    let target = new_fs().await.unwrap();
    _ = restore(&target, &Bytes::from(out), RestoreOptions::default(), |_| {})
        .await
        .unwrap();
    assert_isomorphic(&source, &target).await.unwrap();
}
