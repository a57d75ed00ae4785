use crate::common::{format_size, open_store};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

pub async fn du_command<W: Write>(store_path: &Path, out: &mut W) -> Result<()> {
    let fs = open_store(store_path).await?;
    let total = fs.collect_total_size().await?;
    writeln!(out, "{} ({total} bytes)", format_size(total))?;
    Ok(())
}
