//! The compiled blog post

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::markdown::Rendered;
use super::schema::PostMeta;
use super::toc::{self, FlatTocItem, TocEntry};

/// A blog post compiled from one source document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// URL-safe identifier, unique in the collection
    pub slug: String,

    /// Same value as `slug`, for route parameters
    pub slug_as_params: String,

    pub title: String,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Last updated date
    pub updated: Option<DateTime<Utc>>,

    pub description: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,

    /// Unpublished posts never reach a public route
    pub published: bool,
    pub featured: bool,
    pub draft: bool,

    pub excerpt: Option<String>,

    /// Cover image URL
    pub image: Option<String>,

    /// Minutes, rounded up
    pub reading_time: u32,

    /// Nested table of contents
    pub toc: Vec<TocEntry>,

    /// Rendered HTML body
    pub content: String,

    /// Source path relative to the content directory
    #[serde(skip)]
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// File to copy for a relative `image`
    #[serde(skip)]
    pub image_source: Option<PathBuf>,
}

impl BlogPost {
    /// Assemble a post from validated metadata and its rendered body
    pub fn new(meta: PostMeta, rendered: Rendered, reading_time: u32, toc_max_depth: u8) -> Self {
        Self {
            slug_as_params: meta.slug.clone(),
            slug: meta.slug,
            title: meta.title,
            date: meta.date,
            updated: meta.updated,
            description: meta.description,
            author: meta.author,
            tags: meta.tags,
            category: meta.category,
            published: meta.published,
            featured: meta.featured,
            draft: meta.draft,
            excerpt: meta.excerpt,
            image: meta.image,
            reading_time,
            toc: toc::build(&rendered.headings, toc_max_depth),
            content: rendered.html,
            source: String::new(),
            full_source: PathBuf::new(),
            image_source: None,
        }
    }

    /// Table of contents as an indented list
    pub fn flat_toc(&self) -> Vec<FlatTocItem> {
        toc::flatten(&self.toc)
    }

    /// Date the post was last touched
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.date)
    }

    /// Public route of the post
    pub fn path(&self) -> String {
        format!("blog/{}/", self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::toc::Heading;
    use chrono::TimeZone;

    fn meta() -> PostMeta {
        PostMeta {
            title: "Hello".to_string(),
            slug: "hello".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            updated: None,
            description: None,
            author: "A".to_string(),
            tags: vec!["rust".to_string()],
            category: "C".to_string(),
            published: true,
            featured: false,
            draft: false,
            excerpt: None,
            image: None,
        }
    }

    #[test]
    fn test_new_builds_toc_and_slug_params() {
        let rendered = Rendered {
            html: "<h2>x</h2>".to_string(),
            headings: vec![
                Heading { level: 2, title: "A".into(), anchor: "a".into() },
                Heading { level: 3, title: "B".into(), anchor: "b".into() },
            ],
        };
        let post = BlogPost::new(meta(), rendered, 3, 6);
        assert_eq!(post.slug_as_params, "hello");
        assert_eq!(post.reading_time, 3);
        assert_eq!(post.toc.len(), 1);
        assert_eq!(post.toc[0].items[0].url, "#b");
        assert_eq!(post.flat_toc()[1].depth, 2);
        assert_eq!(post.path(), "blog/hello/");
    }

    #[test]
    fn test_serializes_camel_case_without_source_fields() {
        let mut post = BlogPost::new(meta(), Rendered::default(), 0, 6);
        post.source = "blog/hello.md".to_string();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["slugAsParams"], "hello");
        assert_eq!(json["readingTime"], 0);
        assert_eq!(json["date"], "2024-01-15T00:00:00Z");
        assert!(json.get("source").is_none());
        assert!(json.get("fullSource").is_none());
    }

    #[test]
    fn test_last_modified() {
        let mut post = BlogPost::new(meta(), Rendered::default(), 0, 6);
        assert_eq!(post.last_modified(), post.date);
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        post.updated = Some(later);
        assert_eq!(post.last_modified(), later);
    }
}
