use crate::memory::new_fs;
use crate::reserved::{ReservedSlot, ensure_reserved_folders, reserved_folder};

#[tokio::test]
async fn test_provisioning_is_idempotent() {
    let fs = new_fs().await.unwrap();
    assert_eq!(ensure_reserved_folders(&fs).await.unwrap(), 10);
    assert_eq!(ensure_reserved_folders(&fs).await.unwrap(), 0);

    let root = fs.get_root().await.unwrap();
    let entries = root.list().await.unwrap();
    assert_eq!(entries.len(), ReservedSlot::ALL.len());
    for (entry, slot) in entries.iter().zip(ReservedSlot::ALL) {
        assert_eq!(entry.name, slot.name());
        assert!(fs.get_node(&entry.node_id).await.unwrap().unwrap().is_folder());
    }
}

#[tokio::test]
async fn test_missing_slot_is_recreated() {
    let fs = new_fs().await.unwrap();
    _ = ensure_reserved_folders(&fs).await.unwrap();
    let trash = reserved_folder(&fs, ReservedSlot::Trash).await.unwrap().unwrap();
    _ = fs.destroy_node(trash.id()).await.unwrap();
    assert!(reserved_folder(&fs, ReservedSlot::Trash).await.unwrap().is_none());

    assert_eq!(ensure_reserved_folders(&fs).await.unwrap(), 1);
    let again = reserved_folder(&fs, ReservedSlot::Trash).await.unwrap().unwrap();
    assert_ne!(again.id(), trash.id());
}

#[tokio::test]
async fn test_slot_names() {
    assert_eq!(ReservedSlot::CharacterRoster.name(), "Character-roster");
    assert_eq!(
        ReservedSlot::from_name("Materials"),
        Some(ReservedSlot::Materials)
    );
    assert_eq!(ReservedSlot::from_name("desktop"), None);
}
