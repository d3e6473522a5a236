//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# folio configuration

# Site
title: Portfolio
description: Exploring topics like AI Engineering, MLOps, and the latest in artificial intelligence.
author: Harishan P V
language: en

# URL
url: http://localhost:3000
root: /

# Content
content:
  dir: content
  patterns:
    - blog/**/*.md
    - blog/**/*.mdx
  words_per_minute: 200
  toc_max_depth: 6
  timezone: UTC
  default_author: Harishan P V
  default_category: AI Engineering

# Output
output:
  data: .folio
  assets: public/static
  base: /static/
  clean: true
  public_dir: public

# Markdown
markdown:
  dark_theme: base16-ocean.dark
  light_theme: InspiredGitHub
  math: true
  accessible_emojis: true

# Appearance (light, dark or system)
theme: system
nav:
  - name: Home
    href: /
  - name: Work
    href: /work
  - name: Projects
    href: /projects
  - name: Blog
    href: /blog

# Dev server
server:
  ip: localhost
  port: 3000
"#;

/// Initialize a new site in the given directory.
///
/// Existing files are left alone.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("content/blog"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
    } else {
        fs::write(&config_path, CONFIG)?;
    }

    let sample_path = target_dir.join("content/blog/hello-world.md");
    if !sample_path.exists() {
        fs::write(&sample_path, sample_post())?;
    }

    Ok(())
}

fn sample_post() -> String {
    let today = chrono::Utc::now().format("%Y-%m-%d");
    format!(
        r#"---
title: Hello World
date: {}
description: The first post on this site.
tags: [meta]
---

Welcome! Posts live in `content/blog` as Markdown with a front-matter block.

## Writing

Create a new post with:

```bash
$ folio new "My New Post"
```

Math works inline, $E = mc^2$, and in blocks:

$$
\sum_{{i=1}}^{{n}} i = \frac{{n(n+1)}}{{2}}
$$

## Building

```bash
$ folio build
$ folio serve
```
"#,
        today
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_a_loadable_site() {
        let tmp = TempDir::new().unwrap();
        init_site(tmp.path()).unwrap();

        let site = Site::new(tmp.path()).unwrap();
        assert_eq!(site.config.content.words_per_minute, 200);
        let collection = site.load_content().unwrap();
        let post = collection.find_published("hello-world").unwrap();
        assert_eq!(post.tags, vec!["meta"]);
        assert_eq!(post.toc.len(), 2);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(tmp.path()).unwrap();
        let config = fs::read_to_string(tmp.path().join("_config.yml")).unwrap();
        assert_eq!(config, "title: Mine\n");
    }
}
