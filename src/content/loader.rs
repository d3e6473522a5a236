//! Content loader - builds blog posts from the content directory

use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::reading::{count_words, reading_time_with};
use super::schema::{self, SchemaDefaults};
use super::{BlogPost, FrontMatter, MarkdownRenderer, PostCollection};
use crate::assets::is_asset_reference;
use crate::error::{BuildError, Result, ValidationError};
use crate::Site;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Why a single source file did not become a post
enum LoadError {
    Invalid(Vec<ValidationError>),
    Fatal(BuildError),
}

impl From<BuildError> for LoadError {
    fn from(err: BuildError) -> Self {
        Self::Fatal(err)
    }
}

/// Loads blog posts from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
    defaults: SchemaDefaults,
    patterns: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        let content = &site.config.content;
        let defaults = SchemaDefaults::from_config(content)?;
        let patterns = content
            .patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| BuildError::Config(format!("bad content pattern {:?}: {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            site,
            renderer: MarkdownRenderer::with_options(&site.config.markdown),
            defaults,
            patterns,
        })
    }

    /// Load every post and check the collection as a whole
    pub fn load(&self) -> Result<PostCollection> {
        PostCollection::new(self.load_posts()?)
    }

    /// Load all posts in source order.
    ///
    /// Schema violations from every file are gathered before failing, so one
    /// build reports all of them. I/O failures stop at the first file.
    pub fn load_posts(&self) -> Result<Vec<BlogPost>> {
        let content_dir = &self.site.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        let mut errors = Vec::new();

        for path in self.source_files()? {
            match self.load_post(&path) {
                Ok(post) => posts.push(post),
                Err(LoadError::Invalid(mut invalid)) => errors.append(&mut invalid),
                Err(LoadError::Fatal(e)) => return Err(e),
            }
        }

        if !errors.is_empty() {
            return Err(BuildError::Validation(errors));
        }

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), content_dir);
        Ok(posts)
    }

    /// Files under the content directory matching a collection pattern, sorted by path.
    ///
    /// An entry that cannot be read fails the walk instead of being skipped.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let content_dir = &self.site.content_dir;
        let mut files = Vec::new();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(content_dir).to_path_buf();
                BuildError::io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_source(content_dir, entry.path());
            if self
                .patterns
                .iter()
                .any(|p| p.matches_with(&relative, MATCH_OPTIONS))
            {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> std::result::Result<BlogPost, LoadError> {
        let raw = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| {
            LoadError::Invalid(vec![ValidationError::new(path, "frontmatter", e.to_string())])
        })?;

        let meta = schema::validate(fm, path, &self.defaults).map_err(LoadError::Invalid)?;

        let image_source = match meta.image.as_deref() {
            Some(image) if is_asset_reference(image) => {
                let resolved = path.parent().unwrap_or(Path::new("")).join(image);
                if !resolved.is_file() {
                    return Err(LoadError::Invalid(vec![ValidationError::new(
                        path,
                        "image",
                        format!("{:?} does not point to a file", image),
                    )]));
                }
                Some(resolved)
            }
            _ => None,
        };

        let content = &self.site.config.content;
        let rendered = self.renderer.render(body);
        let reading_time = reading_time_with(count_words(body), content.words_per_minute);

        let mut post = BlogPost::new(meta, rendered, reading_time, content.toc_max_depth);
        post.source = relative_source(&self.site.content_dir, path);
        post.full_source = path.to_path_buf();
        post.image_source = image_source;

        tracing::debug!("Loaded post {:?} from {:?}", post.slug, post.source);
        Ok(post)
    }
}

/// Path relative to the content directory, with `/` separators
fn relative_source(content_dir: &Path, path: &Path) -> String {
    path.strip_prefix(content_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
