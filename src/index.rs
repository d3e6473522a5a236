//! Content index written for the page layer

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{BlogPost, PostCollection};
use crate::error::{BuildError, Result};

pub const POSTS_FILE: &str = "posts.json";
pub const SUMMARY_FILE: &str = "index.json";

/// Summary of one build
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary<'a> {
    pub count: usize,
    pub published: usize,
    /// Slugs of the public listing, newest first
    pub listing: Vec<&'a str>,
    pub tags: IndexMap<String, usize>,
    pub categories: IndexMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> IndexSummary<'a> {
    pub fn new(collection: &'a PostCollection, generated_at: DateTime<Utc>) -> Self {
        let listing: Vec<&str> = collection
            .published()
            .into_iter()
            .map(|p| p.slug.as_str())
            .collect();
        Self {
            count: collection.len(),
            published: listing.len(),
            listing,
            tags: collection.tags(),
            categories: collection.categories(),
            generated_at,
        }
    }
}

/// Write `posts.json` and `index.json` into `data_dir`
///
/// `posts.json` holds every post in source order, unpublished ones included.
/// Returns the paths written.
pub fn write(collection: &PostCollection, data_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(data_dir).map_err(|e| BuildError::io(data_dir, e))?;

    let posts: &[BlogPost] = collection.posts();
    let posts_path = data_dir.join(POSTS_FILE);
    write_json(&posts_path, &posts)?;

    let summary = IndexSummary::new(collection, Utc::now());
    let summary_path = data_dir.join(SUMMARY_FILE);
    write_json(&summary_path, &summary)?;

    tracing::info!("Wrote content index for {} posts to {:?}", posts.len(), data_dir);
    Ok(vec![posts_path, summary_path])
}

/// Read back a `posts.json`
pub fn read_posts(data_dir: &Path) -> Result<Vec<BlogPost>> {
    let path = data_dir.join(POSTS_FILE);
    let raw = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| BuildError::io(path, e))
}
