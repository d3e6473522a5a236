//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::slug::derive_slug;
use crate::Site;

/// Create `content/blog/<slug>.md` with a filled-in front-matter block
pub fn create_post(site: &Site, title: &str) -> Result<PathBuf> {
    let slug = derive_slug(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let target_dir = site.content_dir.join("blog");
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        "---\ntitle: {}\ndate: {}\ndescription: \"\"\ntags: []\ncategory: {}\npublished: false\n---\n",
        yaml_string(title),
        chrono::Utc::now().format("%Y-%m-%d"),
        yaml_string(&site.config.content.default_category),
    );
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Double-quoted YAML scalar
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
