//! Markdown rendering: heading anchors, dual-theme highlighting, math, emoji

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::slug::AnchorSlugger;
use super::toc::Heading;
use crate::config::MarkdownConfig;

/// Longest emoji sequence (in chars) tried when wrapping emoji
const MAX_EMOJI_CHARS: usize = 10;

/// Output of rendering one document
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    /// Headings in document order, with the anchors written into `html`
    pub headings: Vec<Heading>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    dark_theme: String,
    light_theme: String,
    math: bool,
    accessible_emojis: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&MarkdownConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &MarkdownConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            dark_theme: config.dark_theme.clone(),
            light_theme: config.light_theme.clone(),
            math: config.math,
            accessible_emojis: config.accessible_emojis,
        }
    }

    /// Render markdown to HTML and collect its headings
    pub fn render(&self, markdown: &str) -> Rendered {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        if self.math {
            options |= Options::ENABLE_MATH;
        }
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut slugger = AnchorSlugger::new();

        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        // (explicit id, classes, inner events, plain text) of the open heading
        let mut open_heading: Option<(Option<String>, Vec<String>, Vec<Event>, String)> = None;

        for event in parser {
            let event = match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // "rust title=main.rs" -> "rust"
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                    continue;
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref());
                    code_block_lang = None;
                    Event::Html(CowStr::from(highlighted))
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                    continue;
                }
                Event::Start(Tag::Heading { id, classes, .. }) => {
                    open_heading = Some((
                        id.map(|i| i.to_string()),
                        classes.iter().map(|c| c.to_string()).collect(),
                        Vec::new(),
                        String::new(),
                    ));
                    continue;
                }
                Event::End(TagEnd::Heading(level)) => {
                    let Some((id, classes, inner, text)) = open_heading.take() else {
                        continue;
                    };
                    let level = level as u8;
                    let anchor = match id {
                        Some(id) => slugger.reserve(&id),
                        None => slugger.slug(&text),
                    };
                    let class_attr = if classes.is_empty() {
                        String::new()
                    } else {
                        format!(r#" class="{}""#, html_escape(&classes.join(" ")))
                    };

                    let mut inner_html = String::new();
                    html::push_html(&mut inner_html, inner.into_iter());
                    headings.push(Heading {
                        level,
                        title: text.trim().to_string(),
                        anchor: anchor.clone(),
                    });

                    Event::Html(CowStr::from(format!(
                        r##"<h{level} id="{id}"{class_attr}><a class="anchor" aria-label="Link to section" href="#{id}">{inner_html}</a></h{level}>
"##,
                        id = html_escape(&anchor),
                    )))
                }
                Event::InlineMath(math) => Event::InlineHtml(CowStr::from(format!(
                    r#"<span class="math math-inline">{}</span>"#,
                    html_escape(&math)
                ))),
                Event::DisplayMath(math) => Event::Html(CowStr::from(format!(
                    r#"<span class="math math-display">{}</span>"#,
                    html_escape(&math)
                ))),
                Event::Text(text) if self.accessible_emojis => match wrap_emojis(&text) {
                    Some(wrapped) => Event::InlineHtml(CowStr::from(wrapped)),
                    None => Event::Text(text),
                },
                other => other,
            };

            match open_heading.as_mut() {
                Some((_, _, inner, text)) => {
                    match &event {
                        Event::Text(t) | Event::Code(t) => text.push_str(t),
                        // emoji-wrapped text still counts towards the heading title
                        Event::InlineHtml(_) => text.push_str(&strip_tags(&event_html(&event))),
                        _ => {}
                    }
                    inner.push(event);
                }
                None => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Rendered {
            html: html_output,
            headings,
        }
    }

    /// Highlight a code block once per color scheme
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut blocks = String::new();
        let mut schemes = vec![("dark", self.dark_theme.as_str())];
        if self.light_theme != self.dark_theme {
            schemes.push(("light", self.light_theme.as_str()));
        }

        for (scheme, theme_name) in schemes {
            let body = self
                .theme(theme_name)
                .and_then(|theme| {
                    let mut highlighter = HighlightLines::new(syntax, theme);
                    let mut out = String::new();
                    for line in LinesWithEndings::from(code) {
                        let regions = highlighter.highlight_line(line, &self.syntax_set).ok()?;
                        out.push_str(
                            &styled_line_to_highlighted_html(&regions, IncludeBackground::No)
                                .ok()?,
                        );
                    }
                    Some(out)
                })
                .unwrap_or_else(|| html_escape(code));

            blocks.push_str(&format!(
                r#"<pre data-language="{lang}" data-theme="{scheme}"><code class="language-{lang}">{body}</code></pre>"#,
                lang = html_escape(lang),
            ));
        }

        format!(r#"<figure class="code-figure">{}</figure>"#, blocks)
    }

    fn theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set.themes.get(name).or_else(|| {
            tracing::warn!("Unknown highlight theme {:?}, using a bundled one", name);
            self.theme_set.themes.values().next()
        })
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap emoji in `<span role="img" aria-label="...">` so screen readers name them.
///
/// Returns `None` when `text` holds no emoji; otherwise the whole text, escaped.
fn wrap_emojis(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut found = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if !c.is_ascii() {
            if let Some((len, emoji)) = longest_emoji(rest) {
                out.push_str(&format!(
                    r#"<span role="img" aria-label="{}">{}</span>"#,
                    html_escape(emoji.name()),
                    &rest[..len]
                ));
                rest = &rest[len..];
                found = true;
                continue;
            }
        }
        out.push_str(&html_escape(&rest[..c.len_utf8()]));
        rest = &rest[c.len_utf8()..];
    }

    found.then_some(out)
}

fn longest_emoji(s: &str) -> Option<(usize, &'static emojis::Emoji)> {
    let ends: Vec<usize> = s
        .char_indices()
        .take(MAX_EMOJI_CHARS)
        .map(|(i, c)| i + c.len_utf8())
        .collect();
    ends.iter()
        .rev()
        .find_map(|&end| emojis::get(&s[..end]).map(|emoji| (end, emoji)))
}

fn event_html(event: &Event) -> String {
    let mut out = String::new();
    html::push_html(&mut out, std::iter::once(event.clone()));
    out
}

fn strip_tags(s: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("This is a **test**.");
        assert!(out.html.contains("<p>This is a <strong>test</strong>.</p>"));
        assert!(out.headings.is_empty());
    }

    #[test]
    fn test_headings_get_ids_and_anchor_links() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("# Hello World\n\nText\n\n## Hello World\n");
        assert!(out.html.contains(
            r##"<h1 id="hello-world"><a class="anchor" aria-label="Link to section" href="#hello-world">Hello World</a></h1>"##
        ));
        assert!(out.html.contains(r#"<h2 id="hello-world-1">"#));
        assert_eq!(out.headings.len(), 2);
        assert_eq!(out.headings[1].level, 2);
        assert_eq!(out.headings[1].anchor, "hello-world-1");
    }

    #[test]
    fn test_heading_with_inline_code_and_explicit_id() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("## Using `cargo` {#cargo-usage}\n");
        assert_eq!(out.headings[0].title, "Using cargo");
        assert_eq!(out.headings[0].anchor, "cargo-usage");
        assert!(out.html.contains("<code>cargo</code>"));
        assert!(out.html.contains(r#"id="cargo-usage""#));
    }

    #[test]
    fn test_render_code_block_both_schemes() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("```rust\nfn main() {}\n```");
        assert!(out.html.contains(r#"class="code-figure""#));
        assert!(out.html.contains(r#"data-theme="dark""#));
        assert!(out.html.contains(r#"data-theme="light""#));
        assert!(out.html.contains(r#"data-language="rust""#));
        assert!(!out.html.contains("background-color"));
    }

    #[test]
    fn test_unlabeled_code_block_is_escaped_not_parsed() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("```\n# not a heading <b>\n```");
        assert!(out.headings.is_empty());
        assert!(out.html.contains("&lt;b&gt;"));
        assert!(out.html.contains(r#"data-language="text""#));
    }

    #[test]
    fn test_math_markup() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("Euler: $e^{i\\pi} + 1 = 0$\n\n$$\na < b\n$$\n");
        assert!(out.html.contains(r#"<span class="math math-inline">e^{i\pi} + 1 = 0</span>"#));
        assert!(out.html.contains(r#"<span class="math math-display">"#));
        assert!(out.html.contains("a &lt; b"));
    }

    #[test]
    fn test_gfm_table_and_tasklist() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n");
        assert!(out.html.contains("<table>"));
        assert!(out.html.contains("checkbox"));
    }

    #[test]
    fn test_accessible_emojis() {
        let renderer = MarkdownRenderer::new();
        let out = renderer.render("Shipped it 🚀 & done");
        assert!(out.html.contains(r#"<span role="img" aria-label="rocket">🚀</span>"#));
        assert!(out.html.contains("&amp; done"));
    }

    #[test]
    fn test_emoji_wrapping_disabled() {
        let config = MarkdownConfig {
            accessible_emojis: false,
            ..Default::default()
        };
        let out = MarkdownRenderer::with_options(&config).render("Party 🎉");
        assert!(!out.html.contains("role=\"img\""));
    }

    #[test]
    fn test_wrap_emojis_plain_text() {
        assert_eq!(wrap_emojis("no emoji here, café"), None);
    }
}
