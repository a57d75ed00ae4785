use crate::common::{format_node_id, open_store};
use anyhow::{Result, anyhow};
use foliofs::{Entry, FS, Node, NodeId};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

pub async fn list_command<W: Write>(store_path: &Path, id: Option<&str>, out: &mut W) -> Result<()> {
    let fs = open_store(store_path).await?;
    let start = id.map_or_else(NodeId::root, NodeId::from);
    let node = fs
        .get_node(&start)
        .await?
        .ok_or_else(|| anyhow!("No node {start}"))?;

    for line in tree_lines(&fs, &node).await? {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// One line per entry, indented by depth. A folder reached a second time
/// (shared or cyclic) is shown but not descended again.
pub async fn tree_lines(fs: &FS, start: &Node) -> Result<Vec<String>> {
    let start_id = format_node_id(start.id().as_str());
    let Some(folder) = start.as_folder() else {
        return Ok(vec![format!("[{start_id}]")]);
    };

    let mut lines = vec![format!("/ [{start_id}]")];
    let mut visited = HashSet::from([folder.id().clone()]);
    let mut stack: Vec<(usize, Entry)> = children(&folder.list().await?, 1);

    while let Some((depth, entry)) = stack.pop() {
        let indent = "  ".repeat(depth);
        let id = format_node_id(entry.node_id.as_str());
        let Some(node) = fs.get_node(&entry.node_id).await? else {
            lines.push(format!("{indent}{} [{id}] (missing)", entry.name));
            continue;
        };

        if let Some(child) = node.as_folder() {
            if !visited.insert(child.id().clone()) {
                lines.push(format!("{indent}{}/ [{id}] (seen)", entry.name));
                continue;
            }
            lines.push(format!("{indent}{}/ [{id}]", entry.name));
            stack.extend(children(&child.list().await?, depth + 1));
        } else if let Some(file) = node.as_file() {
            let media_type = file.media_type().await?.unwrap_or_else(|| "-".to_string());
            lines.push(format!("{indent}{} [{id}] {media_type}", entry.name));
        }
    }
    Ok(lines)
}

// reversed so popping visits entries in folder order
fn children(entries: &[Entry], depth: usize) -> Vec<(usize, Entry)> {
    entries.iter().rev().map(|e| (depth, e.clone())).collect()
}
