//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Content
    #[serde(default)]
    pub content: ContentConfig,

    // Output
    #[serde(default)]
    pub output: OutputConfig,

    // Markdown
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Appearance
    pub theme: String,
    #[serde(default = "default_nav")]
    pub nav: Vec<NavItemConfig>,

    // Dev server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: "Harishan P V".to_string(),
            language: "en".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            content: ContentConfig::default(),
            output: OutputConfig::default(),
            markdown: MarkdownConfig::default(),

            theme: "system".to_string(),
            nav: default_nav(),

            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }
}

/// Blog post collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content root, relative to the site directory
    pub dir: String,
    /// Glob patterns (relative to `dir`) selecting post sources
    pub patterns: Vec<String>,
    pub words_per_minute: u32,
    pub toc_max_depth: u8,
    /// IANA timezone used for front-matter dates without an offset
    pub timezone: String,
    pub default_author: String,
    pub default_category: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: "content".to_string(),
            patterns: vec!["blog/**/*.md".to_string(), "blog/**/*.mdx".to_string()],
            words_per_minute: 200,
            toc_max_depth: 6,
            timezone: "UTC".to_string(),
            default_author: "Harishan P V".to_string(),
            default_category: "AI Engineering".to_string(),
        }
    }
}

/// Where build output lands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Generated content index
    pub data: String,
    /// Copied static assets
    pub assets: String,
    /// Public URL prefix of `assets`
    pub base: String,
    /// Remove `data` and `assets` before each build
    pub clean: bool,
    /// Rendered pages
    pub public_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data: ".folio".to_string(),
            assets: "public/static".to_string(),
            base: "/static/".to_string(),
            clean: true,
            public_dir: "public".to_string(),
        }
    }
}

/// Markdown rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub dark_theme: String,
    pub light_theme: String,
    pub math: bool,
    pub accessible_emojis: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            dark_theme: "base16-ocean.dark".to_string(),
            light_theme: "InspiredGitHub".to_string(),
            math: true,
            accessible_emojis: true,
        }
    }
}

/// Navigation bar entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavItemConfig {
    pub name: String,
    pub href: String,
}

fn default_nav() -> Vec<NavItemConfig> {
    [("Home", "/"), ("Work", "/work"), ("Projects", "/projects"), ("Blog", "/blog")]
        .into_iter()
        .map(|(name, href)| NavItemConfig {
            name: name.to_string(),
            href: href.to_string(),
        })
        .collect()
}

/// Development server defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content.dir, "content");
        assert_eq!(config.content.words_per_minute, 200);
        assert_eq!(config.content.default_category, "AI Engineering");
        assert_eq!(config.output.base, "/static/");
        assert_eq!(config.nav.len(), 4);
        assert_eq!(config.nav[0].href, "/");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
author: Test User
content:
  words_per_minute: 250
  timezone: Asia/Kolkata
output:
  clean: false
nav:
  - name: Blog
    href: /blog
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.content.words_per_minute, 250);
        assert_eq!(config.content.timezone, "Asia/Kolkata");
        // unspecified nested fields keep their defaults
        assert_eq!(config.content.dir, "content");
        assert!(!config.output.clean);
        assert_eq!(config.output.data, ".folio");
        assert_eq!(config.nav.len(), 1);
    }
}
