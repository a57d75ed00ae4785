// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A virtual tree of files and folders over pluggable storage.
//!
//! [`FS`] is the handle callers use; a [`PersistenceLayer`] implements one
//! storage substrate. The crate ships an in-memory substrate
//! ([`memory::MemoryPersistence`]); the relational one lives in `foliodb`.

mod content;
mod error;
mod file;
mod folder;
mod fs;
mod id;
mod node;
mod persistence;
mod watch;

pub mod gc;
pub mod media;
pub mod memory;
pub mod reserved;
pub mod snapshot;
pub mod testing;

pub use content::{Blob, Content};
pub use error::{Error, Result};
pub use file::File;
pub use folder::{Entry, Folder};
pub use fs::{FS, PersistSuspension};
pub use id::{BindId, FileSystemId, NodeId};
pub use media::{MediaConverter, SavedState, Storable, Tracked};
pub use node::{Node, NodeKind};
pub use persistence::PersistenceLayer;
pub use reserved::{ReservedSlot, ensure_reserved_folders, reserved_folder};
pub use watch::{WatchHandle, Watcher};

#[cfg(test)]
mod tests;
