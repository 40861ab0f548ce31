use std::collections::BTreeSet;

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use webgrab_common::{AnchorTag, ImageTag};

/// Elements whose text content is never user-visible.
const HIDDEN_PARENTS: &[&str] = &["style", "script", "head", "title", "meta"];

/// Structured content pulled out of one fetched body. `error` is non-fatal
/// diagnostic detail: extraction degrades to empty output instead of
/// propagating parse failures.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub text: String,
    pub image_tags: Vec<ImageTag>,
    pub anchor_tags: Vec<AnchorTag>,
    pub error: Option<String>,
}

/// Extract visible text, image descriptors, and anchor descriptors from a
/// fetched body, dispatching on the declared content type. Bodies declaring
/// an XML type go through the feed branch; everything else is parsed as HTML.
/// `base_url` is the page's final post-redirect URL, used to resolve
/// root-relative `src`/`href` values.
pub fn extract(body: &[u8], content_type: &str, base_url: Option<&str>) -> ExtractedContent {
    if content_type.contains("xml") {
        extract_feed(body)
    } else {
        extract_html(&String::from_utf8_lossy(body), base_url)
    }
}

/// Feed branch: each item becomes one `"{title}: {description}"` line.
/// Image and anchor extraction do not apply to feeds.
fn extract_feed(body: &[u8]) -> ExtractedContent {
    let feed = match feed_rs::parser::parse(body) {
        Ok(feed) => feed,
        Err(e) => {
            return ExtractedContent {
                error: Some(format!("Failed to parse feed: {e}")),
                ..Default::default()
            };
        }
    };

    let text = feed
        .entries
        .iter()
        .map(|entry| {
            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let description = entry
                .summary
                .as_ref()
                .map(|s| s.content.trim().to_string())
                .unwrap_or_default();
            format!("{title}: {description}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    ExtractedContent {
        text,
        ..Default::default()
    }
}

fn extract_html(markup: &str, base_url: Option<&str>) -> ExtractedContent {
    let document = Html::parse_document(markup);
    let base = base_url.and_then(|u| Url::parse(u).ok());

    ExtractedContent {
        text: visible_text(&document),
        image_tags: image_tags(&document, base.as_ref()),
        anchor_tags: anchor_tags(&document, base.as_ref()),
        error: None,
    }
}

/// Visible text: every text node whose enclosing element is not a
/// script/style/head-level element. Comments and doctypes are not text nodes
/// and drop out on their own. Fragments are joined with single spaces and
/// whitespace runs collapsed.
fn visible_text(document: &Html) -> String {
    let mut fragments: Vec<&str> = Vec::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        // Text directly under the document root has no enclosing element and
        // is not rendered either.
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if HIDDEN_PARENTS.contains(&parent.value().name()) {
            continue;
        }
        let trimmed = text.text.trim();
        if !trimmed.is_empty() {
            fragments.push(trimmed);
        }
    }

    fragments
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `<img>` descriptors: only elements carrying both `alt` and `src`.
/// Root-relative `src` values are resolved against the base URL when known.
fn image_tags(document: &Html, base: Option<&Url>) -> Vec<ImageTag> {
    let selector = Selector::parse("img").expect("valid selector");

    document
        .select(&selector)
        .filter_map(|el| {
            let alt = el.value().attr("alt")?;
            let src = el.value().attr("src")?;
            Some(ImageTag {
                alt: alt.to_string(),
                src: resolve_root_relative(src, base),
            })
        })
        .collect()
}

/// Anchor descriptors: deduplicated, sorted, fragment-only and trivial hrefs
/// excluded, trailing slash stripped, root-relative hrefs resolved.
fn anchor_tags(document: &Html, base: Option<&Url>) -> Vec<AnchorTag> {
    let selector = Selector::parse("a[href]").expect("valid selector");

    let mut hrefs: BTreeSet<String> = BTreeSet::new();
    for el in document.select(&selector) {
        let href = el.value().attr("href").unwrap_or_default().trim();
        if href.len() <= 1 || href.starts_with('#') {
            continue;
        }

        let mut resolved = resolve_root_relative(href, base);
        if resolved.ends_with('/') {
            resolved.pop();
        }
        hrefs.insert(resolved);
    }

    hrefs.into_iter().map(|href| AnchorTag { href }).collect()
}

fn resolve_root_relative(value: &str, base: Option<&Url>) -> String {
    if value.starts_with('/') && !value.starts_with("//") {
        if let Some(base) = base {
            if let Ok(joined) = base.join(value) {
                return joined.to_string();
            }
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(markup: &str, base: Option<&str>) -> ExtractedContent {
        extract(markup.as_bytes(), "text/html; charset=utf-8", base)
    }

    #[test]
    fn extracts_visible_text_only() {
        let content = html("<p>Hi</p><script>evil()</script>", None);
        assert_eq!(content.text, "Hi");
        assert!(content.error.is_none());
    }

    #[test]
    fn skips_style_head_title_meta() {
        let content = html(
            "<html><head><title>Page Title</title><style>p{color:red}</style>\
             <meta name=\"a\" content=\"b\"></head><body><p>Body text</p></body></html>",
            None,
        );
        assert_eq!(content.text, "Body text");
    }

    #[test]
    fn anchor_text_counts_as_visible() {
        let content = html(r#"<p>Hello World</p><a href="/about">About</a>"#, None);
        assert_eq!(content.text, "Hello World About");
    }

    #[test]
    fn skips_comments() {
        let content = html("<p>Hi<!-- hidden --></p>", None);
        assert_eq!(content.text, "Hi");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let content = html("<p>Hello\n\n   World</p>  <p>again</p>", None);
        assert_eq!(content.text, "Hello World again");
    }

    #[test]
    fn anchors_deduplicated_sorted_and_resolved() {
        let content = html(
            r##"<a href="/b">b</a><a href="/a">a</a><a href="/a">a again</a>"##,
            Some("https://x.com"),
        );
        assert_eq!(
            content.anchor_tags,
            vec![
                AnchorTag {
                    href: "https://x.com/a".to_string()
                },
                AnchorTag {
                    href: "https://x.com/b".to_string()
                },
            ]
        );
    }

    #[test]
    fn anchors_exclude_fragments_and_trivial_hrefs() {
        let content = html(
            r##"<a href="#top">top</a><a href="/">root</a><a href="https://x.com/real">ok</a>"##,
            Some("https://x.com"),
        );
        assert_eq!(content.anchor_tags.len(), 1);
        assert_eq!(content.anchor_tags[0].href, "https://x.com/real");
    }

    #[test]
    fn anchors_strip_trailing_slash() {
        let content = html(
            r#"<a href="https://x.com/about/">about</a>"#,
            Some("https://x.com"),
        );
        assert_eq!(content.anchor_tags[0].href, "https://x.com/about");
    }

    #[test]
    fn anchors_without_base_stay_relative() {
        let content = html(r#"<a href="/about">about</a>"#, None);
        assert_eq!(content.anchor_tags[0].href, "/about");
    }

    #[test]
    fn images_require_both_alt_and_src() {
        let content = html(
            r#"<img src="/x.png"><img alt="no source"><img alt="logo" src="/logo.png">"#,
            Some("https://x.com"),
        );
        assert_eq!(
            content.image_tags,
            vec![ImageTag {
                alt: "logo".to_string(),
                src: "https://x.com/logo.png".to_string()
            }]
        );
    }

    #[test]
    fn absolute_image_src_untouched() {
        let content = html(
            r#"<img alt="a" src="https://cdn.example.com/a.png">"#,
            Some("https://x.com"),
        );
        assert_eq!(content.image_tags[0].src, "https://cdn.example.com/a.png");
    }

    #[test]
    fn feed_branch_joins_title_and_description() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
<title>Chan</title><link>https://x.com</link><description>d</description>
<item><title>First</title><description>one</description></item>
<item><title>Second</title><description>two</description></item>
</channel></rss>"#;
        let content = extract(rss.as_bytes(), "application/rss+xml", None);
        assert_eq!(content.text, "First: one\nSecond: two");
        assert!(content.image_tags.is_empty());
        assert!(content.anchor_tags.is_empty());
        assert!(content.error.is_none());
    }

    #[test]
    fn unparsable_feed_degrades_to_error_string() {
        let content = extract(b"not xml at all", "text/xml", None);
        assert!(content.text.is_empty());
        assert!(content.error.is_some());
    }

    #[test]
    fn empty_html_yields_empty_content() {
        let content = html("", None);
        assert!(content.text.is_empty());
        assert!(content.error.is_none());
    }
}
