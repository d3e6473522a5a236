//! Copies files referenced by posts into the public assets directory

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

/// Whether a front-matter path points at a file next to the post
///
/// Only explicitly relative paths count; bare names, absolute paths and URLs
/// are served as written.
pub fn is_asset_reference(value: &str) -> bool {
    value.starts_with("./") || value.starts_with("../")
}

/// Public file name: `<stem>-<hash6>.<ext>`
pub fn hashed_name(source: &Path, bytes: &[u8]) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    let hash = format!("{:016x}", hash_bytes(bytes));
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, &hash[..6], ext),
        None => format!("{}-{}", stem, &hash[..6]),
    }
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Copies assets once each and remembers their public URLs
pub struct AssetCopier {
    assets_dir: PathBuf,
    base: String,
    copied: HashMap<PathBuf, String>,
}

impl AssetCopier {
    pub fn new(assets_dir: impl Into<PathBuf>, base: &str) -> Self {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        Self {
            assets_dir: assets_dir.into(),
            base,
            copied: HashMap::new(),
        }
    }

    /// Copy `source` into the assets directory and return its public URL
    pub fn copy(&mut self, source: &Path) -> Result<String> {
        if let Some(url) = self.copied.get(source) {
            return Ok(url.clone());
        }

        let bytes = fs::read(source).map_err(|e| BuildError::io(source, e))?;
        let name = hashed_name(source, &bytes);
        let dest = self.assets_dir.join(&name);

        fs::create_dir_all(&self.assets_dir).map_err(|e| BuildError::io(&self.assets_dir, e))?;
        if !dest.exists() {
            fs::write(&dest, &bytes).map_err(|e| BuildError::io(&dest, e))?;
            tracing::debug!("Copied asset {:?} -> {:?}", source, dest);
        }

        let url = format!("{}{}", self.base, name);
        self.copied.insert(source.to_path_buf(), url.clone());
        Ok(url)
    }

    /// Number of distinct files copied so far
    pub fn len(&self) -> usize {
        self.copied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copied.is_empty()
    }
}
