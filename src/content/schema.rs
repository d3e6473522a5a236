//! Blog post schema: required fields, bounds, defaults

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::path::Path;

use super::slug::{derive_slug, is_valid_slug};
use super::FrontMatter;
use crate::config::ContentConfig;
use crate::error::{BuildError, ValidationError};

pub const MAX_TITLE_CHARS: usize = 99;
pub const MAX_DESCRIPTION_CHARS: usize = 999;

/// Values filled in when the front-matter leaves a field out
#[derive(Debug, Clone)]
pub struct SchemaDefaults {
    pub author: String,
    pub category: String,
    /// Zone for dates written without an offset
    pub timezone: Tz,
}

impl SchemaDefaults {
    pub fn from_config(config: &ContentConfig) -> Result<Self, BuildError> {
        let timezone = config.timezone.parse::<Tz>().map_err(|e| {
            BuildError::Config(format!("unknown timezone {:?}: {}", config.timezone, e))
        })?;
        Ok(Self {
            author: config.default_author.clone(),
            category: config.default_category.clone(),
            timezone,
        })
    }
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        Self {
            author: "Harishan P V".to_string(),
            category: "AI Engineering".to_string(),
            timezone: Tz::UTC,
        }
    }
}

/// Front-matter after validation, every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct PostMeta {
    pub title: String,
    pub slug: String,
    pub date: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,
    pub published: bool,
    pub featured: bool,
    pub draft: bool,
    pub excerpt: Option<String>,
    pub image: Option<String>,
}

/// Check raw front-matter against the post schema.
///
/// Every violation in the file is reported, not just the first one.
pub fn validate(
    fm: FrontMatter,
    path: &Path,
    defaults: &SchemaDefaults,
) -> Result<PostMeta, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let title = match fm.title {
        Some(title) if !title.trim().is_empty() => {
            if title.chars().count() > MAX_TITLE_CHARS {
                errors.push(ValidationError::new(
                    path,
                    "title",
                    format!("must be at most {} characters", MAX_TITLE_CHARS),
                ));
            }
            title
        }
        Some(_) => {
            errors.push(ValidationError::new(path, "title", "must not be empty"));
            String::new()
        }
        None => {
            errors.push(ValidationError::new(path, "title", "is required"));
            String::new()
        }
    };

    let slug = match fm.slug {
        Some(slug) => {
            if !is_valid_slug(&slug) {
                errors.push(ValidationError::new(
                    path,
                    "slug",
                    format!("{:?} is not lowercase kebab-case", slug),
                ));
            }
            slug
        }
        None => {
            let derived = derive_slug(&title);
            if derived.is_empty() && !title.is_empty() {
                errors.push(ValidationError::new(
                    path,
                    "slug",
                    "cannot be derived from the title; set it explicitly",
                ));
            }
            derived
        }
    };

    let date = match fm.date.as_deref() {
        Some(raw) => parse_date(raw, defaults.timezone).or_else(|| {
            errors.push(ValidationError::new(
                path,
                "date",
                format!("{:?} is not a valid ISO date", raw),
            ));
            None
        }),
        None => {
            errors.push(ValidationError::new(path, "date", "is required"));
            None
        }
    };

    let updated = fm.updated.as_deref().and_then(|raw| {
        let parsed = parse_date(raw, defaults.timezone);
        if parsed.is_none() {
            errors.push(ValidationError::new(
                path,
                "updated",
                format!("{:?} is not a valid ISO date", raw),
            ));
        }
        parsed
    });

    if let Some(description) = &fm.description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            errors.push(ValidationError::new(
                path,
                "description",
                format!("must be at most {} characters", MAX_DESCRIPTION_CHARS),
            ));
        }
    }

    match date {
        Some(date) if errors.is_empty() => Ok(PostMeta {
            title,
            slug,
            date,
            updated,
            description: fm.description,
            author: fm.author.unwrap_or_else(|| defaults.author.clone()),
            tags: fm.tags,
            category: fm.category.unwrap_or_else(|| defaults.category.clone()),
            published: fm.published,
            featured: fm.featured,
            draft: fm.draft,
            excerpt: fm.excerpt,
            image: fm.image,
        }),
        _ => Err(errors),
    }
}

/// Parse an ISO-8601 date or datetime.
///
/// Values carrying an offset are taken as-is; naive values are placed in `tz`.
pub fn parse_date(s: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let naive = formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
