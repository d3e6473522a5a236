//! The post collection and its public queries

use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;

use super::BlogPost;
use crate::error::{BuildError, ValidationError};

fn duplicate_slugs(posts: &[BlogPost]) -> Vec<ValidationError> {
    let mut owners: HashMap<&str, &BlogPost> = HashMap::new();
    let mut errors = Vec::new();

    for post in posts {
        match owners.get(post.slug.as_str()) {
            Some(first) => errors.push(ValidationError::new(
                &post.full_source,
                "slug",
                format!(
                    "{:?} is already used by {}",
                    post.slug,
                    first.full_source.display()
                ),
            )),
            None => {
                owners.insert(&post.slug, post);
            }
        }
    }

    errors
}

/// All posts of one build, in source order
#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: Vec<BlogPost>,
}

impl PostCollection {
    /// Build a collection, rejecting slugs used by more than one post
    pub fn new(posts: Vec<BlogPost>) -> Result<Self, BuildError> {
        let errors = duplicate_slugs(&posts);
        if !errors.is_empty() {
            return Err(BuildError::Validation(errors));
        }
        Ok(Self { posts })
    }

    /// Point cover images that reference local files at the URLs `copy` returns
    pub fn rewrite_images<F>(&mut self, mut copy: F) -> Result<usize, BuildError>
    where
        F: FnMut(&Path) -> Result<String, BuildError>,
    {
        let mut rewritten = 0;
        for post in &mut self.posts {
            if let Some(source) = &post.image_source {
                post.image = Some(copy(source)?);
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    /// Every post, published or not, in source order
    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Public listing: published posts, newest first.
    ///
    /// The sort is stable, so posts sharing a date keep their source order.
    pub fn published(&self) -> Vec<&BlogPost> {
        let mut listing: Vec<&BlogPost> = self.posts.iter().filter(|p| p.published).collect();
        listing.sort_by(|a, b| b.date.cmp(&a.date));
        listing
    }

    /// Look up a post for its public detail route.
    ///
    /// Unknown and unpublished slugs both come back as `None`.
    pub fn find_published(&self, slug: &str) -> Option<&BlogPost> {
        self.find(slug).filter(|p| p.published)
    }

    /// Look up any post by slug, including unpublished ones
    pub fn find(&self, slug: &str) -> Option<&BlogPost> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Published posts flagged as featured, newest first
    pub fn featured(&self) -> Vec<&BlogPost> {
        self.published().into_iter().filter(|p| p.featured).collect()
    }

    /// Posts flagged as drafts, in source order
    pub fn drafts(&self) -> Vec<&BlogPost> {
        self.posts.iter().filter(|p| p.draft).collect()
    }

    /// Tag usage over the public listing, in first-seen order
    pub fn tags(&self) -> IndexMap<String, usize> {
        let mut tags = IndexMap::new();
        for post in self.published() {
            for tag in &post.tags {
                *tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        tags
    }

    /// Category usage over the public listing, in first-seen order
    pub fn categories(&self) -> IndexMap<String, usize> {
        let mut categories = IndexMap::new();
        for post in self.published() {
            *categories.entry(post.category.clone()).or_insert(0) += 1;
        }
        categories
    }

    /// Listing neighbours of a published post: (newer, older)
    pub fn neighbours(&self, slug: &str) -> (Option<&BlogPost>, Option<&BlogPost>) {
        let listing = self.published();
        let Some(pos) = listing.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let newer = pos.checked_sub(1).map(|i| listing[i]);
        let older = listing.get(pos + 1).copied();
        (newer, older)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::markdown::Rendered;
    use crate::content::schema::PostMeta;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn post(slug: &str, day: u32, published: bool) -> BlogPost {
        let meta = PostMeta {
            title: slug.to_string(),
            slug: slug.to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            updated: None,
            description: None,
            author: "A".to_string(),
            tags: Vec::new(),
            category: "AI Engineering".to_string(),
            published,
            featured: false,
            draft: false,
            excerpt: None,
            image: None,
        };
        let mut post = BlogPost::new(meta, Rendered::default(), 1, 6);
        post.full_source = PathBuf::from(format!("content/blog/{}.md", slug));
        post
    }

    fn slugs(posts: &[&BlogPost]) -> Vec<String> {
        posts.iter().map(|p| p.slug.clone()).collect()
    }

    #[test]
    fn test_published_sorted_newest_first() {
        let collection = PostCollection::new(vec![
            post("old", 1, true),
            post("new", 20, true),
            post("mid", 10, true),
        ])
        .unwrap();
        assert_eq!(slugs(&collection.published()), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_ties_keep_source_order() {
        let collection = PostCollection::new(vec![
            post("first", 5, true),
            post("second", 5, true),
            post("newest", 9, true),
            post("third", 5, true),
        ])
        .unwrap();
        assert_eq!(
            slugs(&collection.published()),
            vec!["newest", "first", "second", "third"]
        );
    }

    #[test]
    fn test_unpublished_hidden_from_listing_and_lookup() {
        let collection =
            PostCollection::new(vec![post("visible", 1, true), post("hidden", 2, false)]).unwrap();
        assert_eq!(slugs(&collection.published()), vec!["visible"]);
        assert!(collection.find_published("hidden").is_none());
        assert!(collection.find_published("missing").is_none());
        assert!(collection.find_published("visible").is_some());
        // still part of the collection itself
        assert!(collection.find("hidden").is_some());
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let err = PostCollection::new(vec![post("same", 1, true), post("same", 2, false)])
            .unwrap_err();
        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "slug");
        assert!(errors[0].message.contains("already used"));
    }

    #[test]
    fn test_tags_and_categories_count_published_only() {
        let mut a = post("a", 3, true);
        a.tags = vec!["rust".into(), "mlops".into()];
        let mut b = post("b", 2, true);
        b.tags = vec!["rust".into()];
        b.category = "Systems".into();
        let mut c = post("c", 1, false);
        c.tags = vec!["secret".into()];

        let collection = PostCollection::new(vec![a, b, c]).unwrap();
        let tags = collection.tags();
        assert_eq!(tags.get_index(0), Some((&"rust".to_string(), &2)));
        assert_eq!(tags.get("mlops"), Some(&1));
        assert!(tags.get("secret").is_none());
        assert_eq!(collection.categories().len(), 2);
    }

    #[test]
    fn test_featured_and_drafts() {
        let mut a = post("a", 1, true);
        a.featured = true;
        let mut b = post("b", 2, false);
        b.featured = true;
        b.draft = true;
        let collection = PostCollection::new(vec![a, b]).unwrap();
        assert_eq!(slugs(&collection.featured()), vec!["a"]);
        assert_eq!(slugs(&collection.drafts()), vec!["b"]);
    }

    #[test]
    fn test_rewrite_images() {
        let mut with_image = post("with-image", 1, true);
        with_image.image = Some("./cover.png".into());
        with_image.image_source = Some(PathBuf::from("content/blog/cover.png"));
        let mut remote = post("remote", 2, true);
        remote.image = Some("https://example.com/x.png".into());

        let mut collection = PostCollection::new(vec![with_image, remote]).unwrap();
        let count = collection
            .rewrite_images(|source| {
                assert!(source.ends_with("cover.png"));
                Ok("/static/cover-abcdef.png".to_string())
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            collection.find("with-image").unwrap().image.as_deref(),
            Some("/static/cover-abcdef.png")
        );
        assert_eq!(
            collection.find("remote").unwrap().image.as_deref(),
            Some("https://example.com/x.png")
        );
    }

    #[test]
    fn test_neighbours() {
        let collection = PostCollection::new(vec![
            post("old", 1, true),
            post("mid", 2, true),
            post("new", 3, true),
        ])
        .unwrap();
        let (newer, older) = collection.neighbours("mid");
        assert_eq!(newer.map(|p| p.slug.as_str()), Some("new"));
        assert_eq!(older.map(|p| p.slug.as_str()), Some("old"));
        assert_eq!(collection.neighbours("new").0.map(|p| p.slug.as_str()), None);
        let (newer, older) = collection.neighbours("nope");
        assert!(newer.is_none() && older.is_none());
    }
}
