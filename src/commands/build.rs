//! Build the content index and pages

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::assets::AssetCopier;
use crate::content::loader::ContentLoader;
use crate::content::PostCollection;
use crate::generator::Generator;
use crate::{index, Site};

/// Run a full build and return the compiled collection
pub fn run(site: &Site) -> Result<PostCollection> {
    let start = Instant::now();

    // Nothing is written until every post is valid
    let mut collection = ContentLoader::new(site)?.load()?;
    tracing::info!("Loaded {} posts", collection.len());

    if site.config.output.clean {
        clean_outputs(site)?;
    }

    let mut copier = AssetCopier::new(&site.assets_dir, &site.config.output.base);
    collection.rewrite_images(|source| copier.copy(source))?;
    if !copier.is_empty() {
        tracing::info!("Copied {} assets to {:?}", copier.len(), site.assets_dir);
    }

    index::write(&collection, &site.data_dir)?;
    Generator::new(site)?.generate(&collection)?;

    tracing::info!("Built in {:.2}s", start.elapsed().as_secs_f64());
    Ok(collection)
}

/// Remove the content index and copied assets from a previous build
fn clean_outputs(site: &Site) -> Result<()> {
    for dir in [&site.data_dir, &site.assets_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
            tracing::debug!("Deleted: {:?}", dir);
        }
    }
    Ok(())
}

/// Reread `_config.yml` and run a full build
pub fn rebuild(base_dir: &Path) -> Result<PostCollection> {
    let site = Site::new(base_dir)?;
    run(&site)
}

/// Watch for file changes and rebuild
pub async fn watch(site: &Site) -> Result<()> {
    let site = site.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&site)).await?
}

fn watch_blocking(site: &Site) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&site.content_dir, RecursiveMode::Recursive)?;

    let config_path = site.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) if !events.is_empty() => {
                tracing::info!("File changed, rebuilding...");
                if let Err(e) = rebuild(&site.base_dir) {
                    tracing::error!("Build failed: {:#}", e);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(tmp: &TempDir, rel: &str, body: &[u8]) {
        let path = tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_build_writes_index_pages_and_assets() {
        let tmp = TempDir::new().unwrap();
        write(
            &tmp,
            "content/blog/hello/index.md",
            b"---\ntitle: Hello\ndate: 2024-01-15\nimage: ./cover.png\n---\nbody\n",
        );
        write(&tmp, "content/blog/hello/cover.png", b"png bytes");

        let site = Site::new(tmp.path()).unwrap();
        let collection = run(&site).unwrap();

        let post = collection.find("hello").unwrap();
        let image = post.image.as_deref().unwrap();
        assert!(image.starts_with("/static/cover-"));
        let copied = site.assets_dir.join(image.trim_start_matches("/static/"));
        assert_eq!(fs::read(copied).unwrap(), b"png bytes");

        assert!(site.data_dir.join("posts.json").is_file());
        assert!(site.public_dir.join("blog/hello/index.html").is_file());
    }

    #[test]
    fn test_build_fails_on_invalid_content() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "content/blog/bad.md", b"---\ndate: 2024-01-15\n---\n");
        let site = Site::new(tmp.path()).unwrap();

        let err = run(&site).unwrap_err();
        let build = err.downcast_ref::<crate::error::BuildError>().unwrap();
        assert_eq!(build.validation_errors()[0].field, "title");
        assert!(!site.data_dir.exists());
    }

    #[test]
    fn test_clean_removes_stale_assets() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "public/static/stale-000000.png", b"old");
        write(&tmp, "content/blog/a.md", b"---\ntitle: A\ndate: 2024-01-15\n---\n");
        let site = Site::new(tmp.path()).unwrap();

        run(&site).unwrap();
        assert!(!site.assets_dir.join("stale-000000.png").exists());
    }

    #[test]
    fn test_rebuild_removes_unpublished_page() {
        let tmp = TempDir::new().unwrap();
        let source = "content/blog/plan.md";
        write(&tmp, source, b"---\ntitle: Secret Plan\ndate: 2024-01-15\n---\nbody\n");
        let site = Site::new(tmp.path()).unwrap();

        run(&site).unwrap();
        let page = site.public_dir.join("blog/secret-plan/index.html");
        assert!(page.is_file());

        write(
            &tmp,
            source,
            b"---\ntitle: Secret Plan\ndate: 2024-01-15\npublished: false\n---\nbody\n",
        );
        let collection = run(&site).unwrap();
        assert!(collection.find_published("secret-plan").is_none());
        assert!(!page.exists());
        assert!(site.public_dir.join("blog/index.html").is_file());
    }

    #[test]
    fn test_rebuild_picks_up_config_changes() {
        let tmp = TempDir::new().unwrap();
        write(&tmp, "_config.yml", b"title: Old Name\n");
        write(&tmp, "content/blog/a.md", b"---\ntitle: A\ndate: 2024-01-15\n---\n");

        rebuild(tmp.path()).unwrap();
        write(&tmp, "_config.yml", b"title: New Name\n");
        rebuild(tmp.path()).unwrap();

        let html = fs::read_to_string(tmp.path().join("public/blog/index.html")).unwrap();
        assert!(html.contains("New Name"));
        assert!(!html.contains("Old Name"));
    }
}
