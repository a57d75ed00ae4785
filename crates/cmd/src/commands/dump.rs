use crate::common::{format_size, open_store};
use anyhow::Result;
use diagnostics::*;
use foliofs::snapshot::dump_to_writer;
use std::io::Write;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write a snapshot to `target`, or to stdout when `target` is `-`
pub async fn dump_command<W: Write>(store_path: &Path, target: &str, out: &mut W) -> Result<()> {
    let fs = open_store(store_path).await?;
    let on_progress = |fraction: f64| {
        let percent = (fraction * 100.0).round() as u64;
        debug!("Dump {percent}% complete", percent);
    };

    if target == "-" {
        let mut stdout = tokio::io::stdout();
        let stats = dump_to_writer(&fs, &mut stdout, on_progress).await?;
        stdout.flush().await?;
        info!("Dumped {records} records to stdout", records: stats.records);
        return Ok(());
    }

    let mut file = tokio::fs::File::create(target).await?;
    let stats = dump_to_writer(&fs, &mut file, on_progress).await?;
    file.flush().await?;
    writeln!(
        out,
        "Dumped {} records ({}) to {target}",
        stats.records,
        format_size(stats.bytes)
    )?;
    Ok(())
}
