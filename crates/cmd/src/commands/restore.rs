use crate::common::open_store;
use anyhow::{Result, bail};
use diagnostics::*;
use foliodb::StoreConfig;
use foliofs::snapshot::{RestoreOptions, restore};
use std::io::Write;
use std::path::Path;

/// Replace the store's contents with the snapshot at `source`
pub async fn restore_command<W: Write>(
    store_path: &Path,
    source: &Path,
    batch_size: Option<usize>,
    out: &mut W,
) -> Result<()> {
    let fs = open_store(store_path).await?;
    let batch_size = match batch_size {
        Some(0) => bail!("--batch-size must be positive"),
        Some(n) => n,
        None => StoreConfig::load(store_path)?.restore_batch_size,
    };

    let stats = restore(
        &fs,
        &source.to_path_buf(),
        RestoreOptions { batch_size },
        |fraction| {
            let percent = (fraction * 100.0).round() as u64;
            debug!("Restore {percent}% complete", percent);
        },
    )
    .await?;

    writeln!(
        out,
        "Restored {} records ({} blobs) in {} batches",
        stats.records, stats.blobs, stats.batches
    )?;
    Ok(())
}
