//! Asset loading.
//!
//! Assets are resolved relative to `./assets` in the working directory.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Where `file_name` lives on disk.
pub fn asset_path(file_name: &str) -> PathBuf {
    Path::new("./").join("assets").join(file_name)
}

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    let txt = std::fs::read_to_string(&path)
        .with_context(|| format!("could not read asset {}", path.display()))?;
    log::debug!("Loaded {} ({} bytes)", path.display(), txt.len());
    Ok(txt)
}
