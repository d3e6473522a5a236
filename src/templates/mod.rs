//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded directly in the binary.

use anyhow::Result;
use chrono::DateTime;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::FlatTocItem;
use crate::widgets::TabIndicator;

pub const LISTING: &str = "blog_list.html";
pub const POST: &str = "post.html";
pub const NOT_FOUND: &str = "404.html";

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies are already HTML; text fields are escaped in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            (LISTING, include_str!("site/blog_list.html")),
            (POST, include_str!("site/post.html")),
            (NOT_FOUND, include_str!("site/404.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format an RFC 3339 timestamp, `Jan 15, 2024` by default
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%b %d, %Y".to_string(),
    };

    match DateTime::parse_from_rfc3339(&s) {
        Ok(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        // not a timestamp, leave it alone
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        let root = if config.root.ends_with('/') {
            config.root.clone()
        } else {
            format!("{}/", config.root)
        };
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavData {
    pub name: String,
    pub href: String,
    pub active: bool,
}

impl NavData {
    /// Navigation items with the tab indicator placed for `pathname`
    pub fn for_path(config: &SiteConfig, pathname: &str) -> Vec<Self> {
        let tabs = TabIndicator::new(config.nav.clone(), pathname);
        tabs.items()
            .iter()
            .map(|item| NavData {
                name: item.name.clone(),
                href: item.href.clone(),
                active: tabs.is_active(&item.name),
            })
            .collect()
    }
}

/// One table-of-contents line in a post page
#[derive(Debug, Clone, Serialize)]
pub struct TocLink {
    /// Anchor id the link tracks
    pub id: String,
    pub url: String,
    pub text: String,
    /// Left indent in rem: `depth - 1`
    pub indent: usize,
}

impl From<&FlatTocItem> for TocLink {
    fn from(item: &FlatTocItem) -> Self {
        Self {
            id: item.url.trim_start_matches('#').to_string(),
            url: item.url.clone(),
            text: item.text.clone(),
            indent: item.depth.saturating_sub(1),
        }
    }
}
