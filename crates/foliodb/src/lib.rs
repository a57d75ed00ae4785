// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! DuckDB-backed storage for `foliofs`.
//!
//! A store is a directory holding `folio.yaml`, the database file and (for
//! local blob storage) the `blobs/` tree.

mod blob_store;
mod config;
mod error;
mod persistence;
mod schema;
mod transaction;

pub use blob_store::BlobStore;
pub use config::{BlobConfig, CONFIG_FILE, StoreConfig};
pub use error::{FolioDbError, Result};
pub use persistence::DuckPersistence;
pub use schema::SCHEMA;

use foliofs::FS;
use std::path::Path;

/// Open the store in `store_dir` with its configured settings
pub async fn open_fs(store_dir: &Path) -> Result<FS> {
    let config = StoreConfig::load(store_dir)?;
    open_fs_with_config(store_dir, &config).await
}

pub async fn open_fs_with_config(store_dir: &Path, config: &StoreConfig) -> Result<FS> {
    let persistence = DuckPersistence::open(store_dir, config)?;
    Ok(FS::new(persistence).await?)
}

/// Filesystem over a transient database and in-memory blobs
pub async fn open_memory_fs() -> Result<FS> {
    Ok(FS::new(DuckPersistence::open_in_memory()?).await?)
}

#[cfg(test)]
mod tests;
