//! Content module - blog posts from source files to a validated collection

mod collection;
mod frontmatter;
pub mod loader;
pub mod markdown;
mod post;
pub mod reading;
pub mod schema;
pub mod slug;
pub mod toc;

pub use collection::PostCollection;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::{MarkdownRenderer, Rendered};
pub use post::BlogPost;
pub use schema::{PostMeta, SchemaDefaults};
pub use toc::{FlatTocItem, TocEntry};
