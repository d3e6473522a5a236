//! Slugs for posts and heading anchors

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9_-]").unwrap();
    static ref KEBAB: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Derive a post slug from its title.
///
/// Lowercases, turns whitespace runs into `-` and drops everything that is not
/// an ASCII word character or `-`. Applying it to its own output is a no-op.
pub fn derive_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let dashed = WHITESPACE.replace_all(&lower, "-");
    NON_WORD.replace_all(&dashed, "").into_owned()
}

/// Whether an author-supplied slug is lowercase kebab-case
pub fn is_valid_slug(slug: &str) -> bool {
    KEBAB.is_match(slug)
}

/// GitHub-style anchor for a heading text
pub fn heading_anchor(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c == ' ' {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Hands out unique anchors within one document
#[derive(Debug, Default)]
pub struct AnchorSlugger {
    seen: HashMap<String, usize>,
}

impl AnchorSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor for `text`, suffixed with `-1`, `-2`, ... on repeats
    pub fn slug(&mut self, text: &str) -> String {
        self.claim(heading_anchor(text))
    }

    /// Reserve an anchor chosen by the author (`{#id}`)
    pub fn reserve(&mut self, id: &str) -> String {
        self.claim(id.to_string())
    }

    // Repeats bump the counter of `base`, never of the suffixed candidate
    fn claim(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        while self.seen.contains_key(&candidate) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}
