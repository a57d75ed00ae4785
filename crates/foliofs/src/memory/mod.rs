//! In-memory storage substrate.
//!
//! Used by tests and for scratch filesystems that never touch disk.

mod persistence;

pub use persistence::MemoryPersistence;

use crate::error::Result;
use crate::fs::FS;

/// Fresh filesystem over an empty [`MemoryPersistence`]
pub async fn new_fs() -> Result<FS> {
    FS::new(MemoryPersistence::default()).await
}
