use crate::common::{format_node_id, open_store};
use anyhow::Result;
use foliofs::gc::{ContentScanWalker, collect_garbage, purge_collected_garbage};
use std::io::Write;
use std::path::Path;

/// Find attachments no document references and, unless `dry_run`, remove them
pub async fn gc_command<W: Write>(store_path: &Path, dry_run: bool, out: &mut W) -> Result<()> {
    let fs = open_store(store_path).await?;
    let report = collect_garbage(&fs, &ContentScanWalker).await?;

    if !report.repair.unlinked.is_empty() {
        writeln!(out, "Repaired {} dangling entries", report.repair.unlinked.len())?;
    }
    writeln!(
        out,
        "{} documents, {} of {} attachments in use",
        report.documents.len(),
        report.used_attachments.len(),
        report.all_attachments.len()
    )?;
    for id in &report.stray_attachments {
        writeln!(out, "stray [{}]", format_node_id(id.as_str()))?;
    }

    if dry_run {
        writeln!(out, "Dry run: {} stray attachments left in place", report.stray_attachments.len())?;
        return Ok(());
    }

    let stats = purge_collected_garbage(&fs, &report).await?;
    writeln!(
        out,
        "Removed {} attachments, unlinked {} entries",
        stats.destroyed, stats.unlinked
    )?;
    Ok(())
}
