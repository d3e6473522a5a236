//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Front-matter that could not be read
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),
    #[error("front-matter opened with `{0}` is never closed")]
    Unclosed(&'static str),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Raw front-matter of a blog post, before schema validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Posts are published unless stated otherwise
    #[serde(default = "default_published")]
    pub published: bool,
    pub featured: bool,
    pub draft: bool,
    pub excerpt: Option<String>,
    pub image: Option<String>,

    /// Fields outside the schema are kept but not interpreted
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            date: None,
            updated: None,
            description: None,
            author: None,
            tags: Vec::new(),
            category: None,
            published: true,
            featured: false,
            draft: false,
            excerpt: None,
            image: None,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if content.starts_with("+++") {
            return Self::parse_toml(content);
        }

        if content.starts_with(";;;") || content.starts_with('{') {
            return Self::parse_json(content);
        }

        // No front-matter found
        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (block, remaining) = split_block(content, "---")?;
        if block.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }
        let fm = serde_yaml::from_str::<FrontMatter>(block)?;
        Ok((fm, remaining))
    }

    fn parse_toml(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (block, remaining) = split_block(content, "+++")?;
        let mut table: toml::Table = toml::from_str(block)?;

        // TOML has native datetimes; the schema reads dates as text
        for (_, value) in table.iter_mut() {
            if let toml::Value::Datetime(dt) = value {
                *value = toml::Value::String(dt.to_string());
            }
        }

        let fm = toml::Value::Table(table).try_into::<FrontMatter>()?;
        Ok((fm, remaining))
    }

    fn parse_json(content: &str) -> Result<(Self, &str), FrontMatterError> {
        // JSON front-matter ends with ;;;
        if let Some(rest) = content.strip_prefix(";;;") {
            let end_pos = rest.find(";;;").ok_or(FrontMatterError::Unclosed(";;;"))?;
            let json_content = format!("{{{}}}", &rest[..end_pos]);
            let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);
            let fm: FrontMatter = serde_json::from_str(&json_content)?;
            return Ok((fm, remaining));
        }

        // Find matching closing brace
        let mut depth = 0;
        let mut in_string = false;
        let mut escaped = false;
        let mut end_pos = None;
        for (i, c) in content.char_indices() {
            if in_string {
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => in_string = false,
                    _ => escaped = false,
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end_pos = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end_pos = end_pos.ok_or(FrontMatterError::Unclosed("{"))?;
        let fm: FrontMatter = serde_json::from_str(&content[..end_pos])?;
        let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);
        Ok((fm, remaining))
    }
}

/// Split `<delim>\n...\n<delim>\nbody` into the block and the body
fn split_block<'a>(
    content: &'a str,
    delimiter: &'static str,
) -> Result<(&'a str, &'a str), FrontMatterError> {
    let rest = content[delimiter.len()..].trim_start_matches(['\n', '\r']);

    // closing delimiter right after the opening one: empty block
    if let Some(after) = rest.strip_prefix(delimiter) {
        return Ok(("", after.trim_start_matches(['\n', '\r'])));
    }

    let closing = format!("\n{}", delimiter);
    let end_pos = rest
        .find(&closing)
        .ok_or(FrontMatterError::Unclosed(delimiter))?;
    let block = &rest[..end_pos];
    let remaining = rest[end_pos + closing.len()..].trim_start_matches(['\n', '\r']);
    Ok((block, remaining))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - mlops
category: Systems
featured: true
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "mlops"]);
        assert_eq!(fm.category.as_deref(), Some("Systems"));
        assert!(fm.featured);
        assert!(fm.published);
        assert!(!fm.draft);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntitle: One Tag\ntags: Notes\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let content = "---\ntitle: Extra\nseries: rag-notes\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.extra.get("series").and_then(|v| v.as_str()),
            Some("rag-notes")
        );
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = r#"+++
title = "From TOML"
date = 2024-03-01
published = false
tags = ["a"]
+++
Body here
"#;
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("From TOML"));
        assert_eq!(fm.date.as_deref(), Some("2024-03-01"));
        assert!(!fm.published);
        assert_eq!(fm.tags, vec!["a"]);
        assert_eq!(remaining.trim(), "Body here");
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test {Post}", "tags": ["a", "b"]}

This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test {Post}"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(remaining.contains("This is content."));
    }

    #[test]
    fn test_parse_semicolon_json_frontmatter() {
        let content = ";;;\n\"title\": \"Fenced\"\n;;;\nBody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Fenced"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown\n").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "# Just markdown\n");
    }

    #[test]
    fn test_empty_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("---\n---\nBody").unwrap();
        assert!(fm.title.is_none());
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_unclosed_frontmatter_is_an_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nBody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unclosed("---")));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let err = FrontMatter::parse("---\ntitle: [unterminated\n---\nBody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let err = FrontMatter::parse("---\ntitle: T\npublished: maybe\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }
}
