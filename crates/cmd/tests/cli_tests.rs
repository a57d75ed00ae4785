// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the folio commands over host-directory stores

use cmd::commands::{
    du_command, dump_command, gc_command, init_command, list_command, repair_command,
    restore_command,
};
use foliofs::testing::{build_gc_scenario, build_sample_tree};
use std::path::Path;
use std::process::Command;

async fn run_init(store: &Path) -> String {
    let mut out = Vec::new();
    init_command(store, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_init_provisions_reserved_folders() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let output = run_init(&store).await;
    assert!(output.contains("(10 reserved folders)"), "{output}");
    assert!(store.join("folio.yaml").is_file());

    let mut out = Vec::new();
    list_command(&store, None, &mut out).await.unwrap();
    let listing = String::from_utf8(out).unwrap();
    assert!(listing.starts_with("/ ["));
    assert!(listing.contains("  Desktop/ ["));
    assert!(listing.contains("  Character-roster/ ["));

    let mut out = Vec::new();
    assert!(init_command(&store, &mut out).await.is_err());
}

#[tokio::test]
async fn test_commands_require_a_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = Vec::new();
    assert!(
        du_command(&dir.path().join("absent"), &mut out)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_dump_restore_between_stores() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let target = dir.path().join("target");
    let snapshot = dir.path().join("snapshot.jsonl");
    _ = run_init(&source).await;
    _ = run_init(&target).await;

    let tree = {
        let fs = foliodb::open_fs(&source).await.unwrap();
        build_sample_tree(&fs).await.unwrap()
    };

    let mut out = Vec::new();
    dump_command(&source, snapshot.to_str().unwrap(), &mut out)
        .await
        .unwrap();
    assert!(String::from_utf8(out).unwrap().starts_with("Dumped "));

    let mut out = Vec::new();
    restore_command(&target, &snapshot, Some(2), &mut out)
        .await
        .unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("(1 blobs)"), "{output}");

    let a = foliodb::open_fs(&source).await.unwrap();
    let b = foliodb::open_fs(&target).await.unwrap();
    foliofs::testing::assert_isomorphic(&a, &b).await.unwrap();
    drop((a, b));

    let mut out = Vec::new();
    list_command(&target, Some(tree.project.as_str()), &mut out)
        .await
        .unwrap();
    let listing = String::from_utf8(out).unwrap();
    assert_eq!(listing.lines().count(), 5);
    assert!(listing.contains("  Chapter ["));

    let mut source_du = Vec::new();
    du_command(&source, &mut source_du).await.unwrap();
    let mut target_du = Vec::new();
    du_command(&target, &mut target_du).await.unwrap();
    assert_eq!(source_du, target_du);

    let mut out = Vec::new();
    assert!(
        restore_command(&target, &snapshot, Some(0), &mut out)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_gc_dry_run_then_purge() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    _ = run_init(&store).await;
    let scenario = {
        let fs = foliodb::open_fs(&store).await.unwrap();
        build_gc_scenario(&fs).await.unwrap()
    };
    drop(scenario.cabinet);
    drop(scenario.images);

    let mut out = Vec::new();
    gc_command(&store, true, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("3 documents, 3 of 4 attachments in use"), "{output}");
    assert!(output.contains("Dry run: 1 stray"), "{output}");

    let mut out = Vec::new();
    gc_command(&store, false, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Removed 1 attachments"), "{output}");

    let fs = foliodb::open_fs(&store).await.unwrap();
    assert!(fs.get_node(&scenario.unreferenced).await.unwrap().is_none());
}

#[tokio::test]
async fn test_repair_reports_dangling_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    _ = run_init(&store).await;
    {
        let fs = foliodb::open_fs(&store).await.unwrap();
        let s = build_gc_scenario(&fs).await.unwrap();
        _ = fs.destroy_node(&s.documents[0]).await.unwrap();
    }

    let mut out = Vec::new();
    repair_command(&store, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("Unlinked D1 ["), "{output}");
    assert!(output.contains("unlinked 1 entries"), "{output}");

    let mut out = Vec::new();
    repair_command(&store, &mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().contains("unlinked 0 entries"));
}

#[test]
fn test_binary_uses_folio_env() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let init = Command::new(env!("CARGO_BIN_EXE_folio"))
        .arg("init")
        .env("FOLIO", &store)
        .output()
        .unwrap();
    assert!(init.status.success());

    let du = Command::new(env!("CARGO_BIN_EXE_folio"))
        .args(["--store", store.to_str().unwrap(), "du"])
        .env_remove("FOLIO")
        .output()
        .unwrap();
    assert!(du.status.success());
    assert!(String::from_utf8_lossy(&du.stdout).contains(" bytes)"));

    let missing = Command::new(env!("CARGO_BIN_EXE_folio"))
        .arg("du")
        .env_remove("FOLIO")
        .output()
        .unwrap();
    assert!(!missing.status.success());
}
