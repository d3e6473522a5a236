//! folio: content pipeline and dev server for a portfolio blog
//!
//! Markdown posts are validated against the post schema, compiled into
//! `BlogPost`s, written out as a content index and rendered into static pages.

pub mod assets;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod index;
pub mod server;
pub mod templates;
pub mod widgets;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at one directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Where blog sources live
    pub content_dir: PathBuf,
    /// Content index output
    pub data_dir: PathBuf,
    /// Copied assets output
    pub assets_dir: PathBuf,
    /// Rendered pages output
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when it exists
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site with an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content.dir);
        let data_dir = base_dir.join(&config.output.data);
        let assets_dir = base_dir.join(&config.output.assets);
        let public_dir = base_dir.join(&config.output.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            data_dir,
            assets_dir,
            public_dir,
        }
    }

    /// Load and validate all posts without writing anything
    pub fn load_content(&self) -> error::Result<content::PostCollection> {
        content::loader::ContentLoader::new(self)?.load()
    }

    /// Run a full build
    pub fn build(&self) -> Result<content::PostCollection> {
        commands::build::run(self)
    }

    /// Remove every build output
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::create_post(self, title)
    }
}
