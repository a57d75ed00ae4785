// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Top-level folders that every store provides under the root.

use crate::error::Result;
use crate::folder::Folder;
use crate::fs::FS;
use diagnostics::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReservedSlot {
    Desktop,
    Cabinet,
    Trash,
    Templates,
    Images,
    Videos,
    Preferences,
    Materials,
    CharacterRoster,
    Archive,
}

impl ReservedSlot {
    pub const ALL: [ReservedSlot; 10] = [
        ReservedSlot::Desktop,
        ReservedSlot::Cabinet,
        ReservedSlot::Trash,
        ReservedSlot::Templates,
        ReservedSlot::Images,
        ReservedSlot::Videos,
        ReservedSlot::Preferences,
        ReservedSlot::Materials,
        ReservedSlot::CharacterRoster,
        ReservedSlot::Archive,
    ];

    /// Folders whose documents are live for garbage collection
    pub const DOCUMENTS: [ReservedSlot; 3] = [
        ReservedSlot::Desktop,
        ReservedSlot::Cabinet,
        ReservedSlot::Trash,
    ];

    /// Folders whose files are collectable attachments
    pub const ATTACHMENTS: [ReservedSlot; 2] = [ReservedSlot::Images, ReservedSlot::Materials];

    /// Entry name under the root
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ReservedSlot::Desktop => "Desktop",
            ReservedSlot::Cabinet => "Cabinet",
            ReservedSlot::Trash => "Trash",
            ReservedSlot::Templates => "Templates",
            ReservedSlot::Images => "Images",
            ReservedSlot::Videos => "Videos",
            ReservedSlot::Preferences => "Preferences",
            ReservedSlot::Materials => "Materials",
            ReservedSlot::CharacterRoster => "Character-roster",
            ReservedSlot::Archive => "Archive",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

impl std::fmt::Display for ReservedSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Create every missing slot folder under the root. Returns the number
/// created; a second call creates none.
pub async fn ensure_reserved_folders(fs: &FS) -> Result<usize> {
    let suspension = fs.suspend_persistence();
    let created = provision(fs).await;
    suspension.resume().await?;
    let created = created?;
    if created > 0 {
        info!("Provisioned {created} reserved folders", created);
    }
    Ok(created)
}

async fn provision(fs: &FS) -> Result<usize> {
    let root = fs.get_root().await?;
    let mut created = 0;
    for slot in ReservedSlot::ALL {
        if resolve(&root, slot).await?.is_some() {
            continue;
        }
        let folder = fs.create_folder().await?;
        _ = root.link(slot.name(), folder.id()).await?;
        created += 1;
    }
    Ok(created)
}

/// The slot's folder, if provisioned. When several root entries carry the
/// slot name, the first one that resolves to a folder wins.
pub async fn reserved_folder(fs: &FS, slot: ReservedSlot) -> Result<Option<Folder>> {
    let root = fs.get_root().await?;
    resolve(&root, slot).await
}

async fn resolve(root: &Folder, slot: ReservedSlot) -> Result<Option<Folder>> {
    for entry in root.get_entries_by_name(slot.name()).await? {
        if let Some(folder) = root
            .fs()
            .get_node(&entry.node_id)
            .await?
            .and_then(|n| n.as_folder())
        {
            return Ok(Some(folder));
        }
    }
    Ok(None)
}
