//! Generator module - renders the blog pages using the built-in Tera templates

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;

use crate::content::{BlogPost, PostCollection};
use crate::templates::{self, NavData, SiteData, TemplateRenderer, TocLink};
use crate::widgets::{script, Theme};
use crate::Site;

/// Static page generator
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
    default_theme: Theme,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let default_theme = site.config.theme.parse::<Theme>().unwrap_or_else(|e| {
            tracing::warn!("{}, using system", e);
            Theme::System
        });

        Ok(Self {
            site: site.clone(),
            renderer,
            default_theme,
        })
    }

    /// Write every page of the blog into the public directory
    pub fn generate(&self, collection: &PostCollection) -> Result<Vec<PathBuf>> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create dir {:?}", public_dir))?;
        self.remove_previous_pages()?;

        let mut written = Vec::new();

        let listing = self.render_listing(collection)?;
        written.push(write_page(&public_dir.join("blog/index.html"), &listing)?);

        // Unpublished posts get no page at all
        for post in collection.published() {
            let html = self.render_post(collection, post)?;
            let output_path = public_dir.join(post.path()).join("index.html");
            written.push(write_page(&output_path, &html)?);
        }

        let not_found = self.render_not_found()?;
        written.push(write_page(&public_dir.join("404.html"), &not_found)?);

        let js = script::render(self.default_theme.as_str());
        written.push(write_page(&public_dir.join(script::SCRIPT_FILE), &js)?);

        tracing::info!(
            "Generated {} files ({} published posts)",
            written.len(),
            collection.published().len()
        );
        Ok(written)
    }

    /// Delete pages left by an earlier build, so renamed and unpublished
    /// posts stop being served
    fn remove_previous_pages(&self) -> Result<()> {
        let public_dir = &self.site.public_dir;

        let blog_dir = public_dir.join("blog");
        if blog_dir.exists() {
            fs::remove_dir_all(&blog_dir)
                .with_context(|| format!("Failed to remove {:?}", blog_dir))?;
            tracing::debug!("Deleted: {:?}", blog_dir);
        }

        for name in ["404.html", script::SCRIPT_FILE] {
            let path = public_dir.join(name);
            if path.is_file() {
                fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            }
        }
        Ok(())
    }

    /// The `/blog` listing page
    pub fn render_listing(&self, collection: &PostCollection) -> Result<String> {
        let mut context = self.create_base_context("/blog");
        context.insert("posts", &collection.published());
        self.renderer.render(templates::LISTING, &context)
    }

    /// The detail page of one post
    pub fn render_post(&self, collection: &PostCollection, post: &BlogPost) -> Result<String> {
        let toc: Vec<TocLink> = post.flat_toc().iter().map(TocLink::from).collect();
        let (newer, older) = collection.neighbours(&post.slug);

        let mut context = self.create_base_context(&format!("/blog/{}", post.slug));
        context.insert("post", post);
        context.insert("toc", &toc);
        context.insert("newer", &newer);
        context.insert("older", &older);
        self.renderer.render(templates::POST, &context)
    }

    /// The page served for unknown routes and hidden posts
    pub fn render_not_found(&self) -> Result<String> {
        let context = self.create_base_context("/404");
        self.renderer.render(templates::NOT_FOUND, &context)
    }

    /// Create a base context with common variables
    fn create_base_context(&self, pathname: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(&self.site.config));
        context.insert("nav", &NavData::for_path(&self.site.config, pathname));
        context.insert("default_theme", self.default_theme.as_str());
        context.insert("current_path", pathname);
        context
    }
}

fn write_page(output_path: &Path, contents: &str) -> Result<PathBuf> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(output_path, contents)
        .with_context(|| format!("Failed to write {:?}", output_path))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(output_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_with(posts: &[(&str, &str)]) -> (TempDir, Site, PostCollection) {
        let tmp = TempDir::new().unwrap();
        for (name, body) in posts {
            let path = tmp.path().join("content/blog").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let site = Site::new(tmp.path()).unwrap();
        let collection = site.load_content().unwrap();
        (tmp, site, collection)
    }

    fn sample() -> (TempDir, Site, PostCollection) {
        site_with(&[
            (
                "first.md",
                "---\ntitle: First Post\ndate: 2024-01-01\ntags: rust\n---\n## Setup\n\ntext\n\n### Install\n\nmore\n",
            ),
            (
                "second.md",
                "---\ntitle: Second Post\ndate: 2024-02-01\ndescription: The <b>second</b> one\n---\nbody\n",
            ),
            (
                "secret.md",
                "---\ntitle: Secret Post\ndate: 2024-03-01\npublished: false\n---\nhidden\n",
            ),
        ])
    }

    #[test]
    fn test_listing_shows_published_newest_first() {
        let (_tmp, site, collection) = sample();
        let html = Generator::new(&site).unwrap().render_listing(&collection).unwrap();
        let second = html.find("Second Post").unwrap();
        let first = html.find("First Post").unwrap();
        assert!(second < first);
        assert!(!html.contains("Secret Post"));
        assert!(html.contains("The &lt;b&gt;second"));
        assert!(html.contains("Feb 01, 2024"));
    }

    #[test]
    fn test_post_page_has_toc_and_neighbours() {
        let (_tmp, site, collection) = sample();
        let generator = Generator::new(&site).unwrap();
        let post = collection.find_published("first-post").unwrap();
        let html = generator.render_post(&collection, post).unwrap();

        assert!(html.contains(r##"<li style="padding-left: 0rem"><a data-toc-link="setup" href="#setup">Setup</a>"##));
        assert!(html.contains(r##"<li style="padding-left: 1rem"><a data-toc-link="install" href="#install">Install</a>"##));
        assert!(html.contains("1 min read"));
        assert!(html.contains(r#"class="newer" href="/blog/second-post""#));
        assert!(!html.contains(r#"class="older""#));
    }

    #[test]
    fn test_generate_writes_published_pages_only() {
        let (_tmp, site, collection) = sample();
        Generator::new(&site).unwrap().generate(&collection).unwrap();

        let public = &site.public_dir;
        assert!(public.join("blog/index.html").is_file());
        assert!(public.join("blog/first-post/index.html").is_file());
        assert!(public.join("blog/second-post/index.html").is_file());
        assert!(!public.join("blog/secret-post").exists());
        assert!(public.join("404.html").is_file());
        let js = fs::read_to_string(public.join("folio.js")).unwrap();
        assert!(js.contains(r#"var DEFAULT_THEME = "system";"#));
    }

    #[test]
    fn test_generate_drops_pages_from_previous_build() {
        let (_tmp, site, collection) = sample();
        let stale = site.public_dir.join("blog/renamed-post/index.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();
        let other = site.public_dir.join("about.html");
        fs::write(&other, "kept").unwrap();

        Generator::new(&site).unwrap().generate(&collection).unwrap();
        assert!(!stale.exists());
        assert!(site.public_dir.join("blog/first-post/index.html").is_file());
        assert_eq!(fs::read_to_string(other).unwrap(), "kept");
    }

    #[test]
    fn test_listing_marks_blog_tab_active() {
        let (_tmp, site, collection) = sample();
        let html = Generator::new(&site).unwrap().render_listing(&collection).unwrap();
        assert!(html.contains(r#"<a data-nav-item href="/blog" class="active">Blog</a>"#));
    }
}
