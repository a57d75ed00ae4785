use anyhow::{Result, anyhow};
use diagnostics::*;
use foliodb::{CONFIG_FILE, StoreConfig};
use foliofs::ensure_reserved_folders;
use std::io::Write;
use std::path::Path;

/// Create a store with the default configuration and provision the reserved folders
pub async fn init_command<W: Write>(store_path: &Path, out: &mut W) -> Result<()> {
    if store_path.join(CONFIG_FILE).exists() {
        return Err(anyhow!("Store already exists at {}", store_path.display()));
    }

    let config = StoreConfig::default();
    config.save(store_path)?;
    let fs = foliodb::open_fs_with_config(store_path, &config).await?;
    let created = ensure_reserved_folders(&fs).await?;

    let path = store_path.display().to_string();
    info!("Initialized store {path}", path: path.as_str(), created);
    writeln!(out, "Initialized store at {path} ({created} reserved folders)")?;
    Ok(())
}
