// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Store configuration, read from `<store>/folio.yaml`.
//!
//! ```yaml
//! restore_batch_size: 1000
//! database: folio.duckdb
//! blobs:
//!   storage_type: s3        # local | memory | s3
//!   bucket: my-folio
//!   region: us-west-2
//!   endpoint: http://localhost:9000
//! ```
//!
//! S3 credentials come from the standard AWS environment variables and are
//! never written to the file.

use crate::error::{FolioDbError, Result};
use diagnostics::*;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_FILE: &str = "folio.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Records per transaction when restoring a snapshot
    #[serde(default = "default_restore_batch_size")]
    pub restore_batch_size: usize,

    /// Database file, relative to the store directory
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub blobs: BlobConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Storage type: "local", "memory" or "s3"
    #[serde(default = "default_storage_type")]
    pub storage_type: String,

    /// Local prefix directory, relative to the store directory. Blobs are
    /// written under `<prefix>/blobs/`.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub region: String,

    /// S3-compatible endpoint; empty for AWS
    #[serde(default)]
    pub endpoint: String,
}

fn default_restore_batch_size() -> usize {
    foliofs::snapshot::DEFAULT_BATCH_SIZE
}

fn default_database() -> String {
    "folio.duckdb".to_string()
}

fn default_storage_type() -> String {
    "local".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            restore_batch_size: default_restore_batch_size(),
            database: default_database(),
            blobs: BlobConfig::default(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            storage_type: default_storage_type(),
            path: String::new(),
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
        }
    }
}

impl StoreConfig {
    /// Read `<store_dir>/folio.yaml`, or defaults when the file is absent
    pub fn load(store_dir: &Path) -> Result<Self> {
        let path = store_dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No {file} in store, using defaults", file: CONFIG_FILE);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: StoreConfig = serde_yaml_ng::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, store_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(store_dir)?;
        std::fs::write(store_dir.join(CONFIG_FILE), serde_yaml_ng::to_string(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.restore_batch_size == 0 {
            return Err(FolioDbError::config("restore_batch_size must be positive"));
        }
        if self.database.is_empty() {
            return Err(FolioDbError::config("database must not be empty"));
        }
        self.blobs.validate()
    }

    #[must_use]
    pub fn database_path(&self, store_dir: &Path) -> PathBuf {
        store_dir.join(&self.database)
    }
}

impl BlobConfig {
    pub fn validate(&self) -> Result<()> {
        match self.storage_type.as_str() {
            "local" | "memory" => Ok(()),
            "s3" if self.bucket.is_empty() => {
                Err(FolioDbError::config("s3 blob storage requires a bucket"))
            }
            "s3" => Ok(()),
            other => Err(FolioDbError::config(format!(
                "invalid storage_type: {other}"
            ))),
        }
    }

    /// Build the object store behind the blob store
    pub fn build_object_store(&self, store_dir: &Path) -> Result<Arc<dyn ObjectStore>> {
        self.validate()?;
        match self.storage_type.as_str() {
            "local" => {
                let prefix = store_dir.join(&self.path);
                std::fs::create_dir_all(&prefix)?;
                let path = prefix.display().to_string();
                debug!("Blob store at {path}", path: path.as_str());
                Ok(Arc::new(
                    object_store::local::LocalFileSystem::new_with_prefix(&prefix)?,
                ))
            }
            "memory" => Ok(Arc::new(object_store::memory::InMemory::new())),
            _ => {
                use object_store::aws::AmazonS3Builder;

                let bucket = self.bucket.as_str();
                info!("Blob store in bucket {bucket}", bucket);
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(&self.bucket);
                if !self.region.is_empty() {
                    builder = builder.with_region(&self.region);
                }
                if !self.endpoint.is_empty() {
                    builder = builder.with_endpoint(&self.endpoint);
                }
                Ok(Arc::new(builder.build()?))
            }
        }
    }
}
