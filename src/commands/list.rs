//! List site content

use anyhow::Result;

use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let collection = site.load_content()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", collection.len());
            for post in collection.posts() {
                println!(
                    "  {} - {} [{}]{}",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source,
                    if post.published { "" } else { " (unpublished)" }
                );
            }
        }
        "tag" | "tags" => {
            let tags = collection.tags();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = collection.categories();
            println!("Categories ({}):", categories.len());
            for (category, count) in categories {
                println!("  {} ({})", category, count);
            }
        }
        "draft" | "drafts" => {
            let drafts = collection.drafts();
            println!("Drafts ({}):", drafts.len());
            for post in drafts {
                println!("  {} [{}]", post.title, post.source);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category, draft",
                content_type
            );
        }
    }

    Ok(())
}
