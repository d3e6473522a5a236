//! Clean build outputs

use anyhow::Result;
use std::fs;

use crate::Site;

/// Remove the public directory, copied assets and the content index
pub fn run(site: &Site) -> Result<()> {
    for dir in [&site.public_dir, &site.assets_dir, &site.data_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }

    Ok(())
}
