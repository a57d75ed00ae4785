// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use foliofs::FS;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the store directory
pub const STORE_ENV: &str = "FOLIO";

/// The store path from `--store`, falling back to the `FOLIO` environment variable
pub fn get_store_path_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    env::var(STORE_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("{STORE_ENV} environment variable not set and no --store given"))
}

/// Open an existing store. Use `init` to create one.
pub async fn open_store(store_path: &Path) -> Result<FS> {
    if !store_path.is_dir() {
        return Err(anyhow!(
            "No store at {}; run `folio init` first",
            store_path.display()
        ));
    }
    Ok(foliodb::open_fs(store_path).await?)
}

/// Last 8 hex digits of a node id (the random part of a UUID7, git-style)
#[must_use]
pub fn format_node_id(node_id: &str) -> String {
    let hex_only: String = node_id.chars().filter(char::is_ascii_hexdigit).collect();
    let len = hex_only.len();
    if len >= 8 {
        hex_only[len - 8..].to_string()
    } else {
        hex_only
    }
}

#[must_use]
pub fn format_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{size}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_node_id() {
        assert_eq!(
            format_node_id("0190c2a4-5b1e-7c3d-8e9f-0123456789ab"),
            "456789ab"
        );
        assert_eq!(format_node_id("abc"), "abc");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12B");
        assert_eq!(format_size(2048), "2.0KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0MB");
    }

    #[test]
    fn test_override_wins() {
        let path = get_store_path_with_override(Some(PathBuf::from("/tmp/x"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x"));
    }
}
