//! Table of contents: heading tree and its flattened form

use serde::{Deserialize, Serialize};

/// A heading found while rendering a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 for `#`, 6 for `######`
    pub level: u8,
    pub title: String,
    pub anchor: String,
}

/// Node of the nested table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    /// `#anchor`
    pub url: String,
    #[serde(default)]
    pub items: Vec<TocEntry>,
}

/// One row of the flattened table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatTocItem {
    pub url: String,
    pub text: String,
    /// Nesting level, roots are 1
    pub depth: usize,
}

/// Nest headings into a tree.
///
/// A heading becomes a child of the closest preceding heading with a smaller
/// level; headings deeper than `max_depth` are skipped.
pub fn build(headings: &[Heading], max_depth: u8) -> Vec<TocEntry> {
    let mut roots: Vec<TocEntry> = Vec::new();
    // levels of the currently open path, parallel to the path into `roots`
    let mut open: Vec<u8> = Vec::new();

    for heading in headings.iter().filter(|h| h.level <= max_depth) {
        while open.last().is_some_and(|&level| level >= heading.level) {
            open.pop();
        }

        let entry = TocEntry {
            title: heading.title.clone(),
            url: format!("#{}", heading.anchor),
            items: Vec::new(),
        };

        let mut siblings = &mut roots;
        for _ in 0..open.len() {
            // every open level has a node at the end of its sibling list
            siblings = &mut siblings.last_mut().expect("open path has a node").items;
        }
        siblings.push(entry);
        open.push(heading.level);
    }

    roots
}

/// Flatten the tree depth-first, keeping document order
pub fn flatten(items: &[TocEntry]) -> Vec<FlatTocItem> {
    let mut flat = Vec::new();
    flatten_into(items, 1, &mut flat);
    flat
}

fn flatten_into(items: &[TocEntry], depth: usize, out: &mut Vec<FlatTocItem>) {
    for item in items {
        out.push(FlatTocItem {
            url: item.url.clone(),
            text: item.title.clone(),
            depth,
        });
        flatten_into(&item.items, depth + 1, out);
    }
}

/// Element ids referenced by the flattened entries
pub fn anchor_ids(items: &[FlatTocItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| !item.url.is_empty())
        .map(|item| item.url.trim_start_matches('#').to_string())
        .collect()
}
