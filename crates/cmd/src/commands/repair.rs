use crate::common::{format_node_id, open_store};
use anyhow::Result;
use foliofs::ReservedSlot;
use foliofs::gc::repair_dangling_entries;
use std::io::Write;
use std::path::Path;

/// Unlink entries under the reserved folders whose target node is gone
pub async fn repair_command<W: Write>(store_path: &Path, out: &mut W) -> Result<()> {
    let fs = open_store(store_path).await?;
    let report = repair_dangling_entries(&fs, &ReservedSlot::ALL).await?;

    for dangling in &report.unlinked {
        writeln!(
            out,
            "Unlinked {} [{}] from [{}]",
            dangling.entry.name,
            format_node_id(dangling.entry.node_id.as_str()),
            format_node_id(dangling.folder.as_str())
        )?;
    }
    writeln!(
        out,
        "Scanned {} folders, unlinked {} entries",
        report.folders_scanned,
        report.unlinked.len()
    )?;
    Ok(())
}
