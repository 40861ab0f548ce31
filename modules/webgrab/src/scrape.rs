use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use webgrab_common::ScrapeResult;

use crate::extract::extract;
use crate::fetch::PageFetcher;
use crate::render::DynamicRenderer;
use crate::sanitize::sanitize;

/// Trait seam over the whole scrape pipeline so the deep-search combinator
/// and tests can substitute a mock.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> ScrapeResult;
}

/// The fetch → extract pipeline with optional dynamic render fallback.
/// Never returns an error: all failure detail lands in
/// [`ScrapeResult::error`] and `is_reachable`.
pub struct Scraper {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Option<Arc<dyn DynamicRenderer>>,
}

impl Scraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            renderer: None,
        }
    }

    /// Attach a dynamic render fallback, invoked when the static path fails
    /// or yields no visible text.
    pub fn with_renderer(mut self, renderer: Arc<dyn DynamicRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Run the fallback renderer. Returns text only when the render produced
    /// some; render failures never propagate.
    async fn render_fallback(&self, url: &str) -> Option<String> {
        let renderer = self.renderer.as_ref()?;
        match renderer.render(url, &self.fetcher.user_agent()).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => {
                warn!(url, renderer = renderer.name(), "Dynamic render yielded no text");
                None
            }
            Err(e) => {
                warn!(url, renderer = renderer.name(), error = %e, "Dynamic render failed");
                None
            }
        }
    }
}

#[async_trait]
impl PageScraper for Scraper {
    async fn scrape(&self, url: &str) -> ScrapeResult {
        let sanitized_url = sanitize(url);
        info!(url, sanitized_url, "Scraping URL");

        let mut result = ScrapeResult::new(url, &sanitized_url);

        match self.fetcher.fetch(&sanitized_url).await {
            Ok(page) => {
                result.redirected_url = Some(page.final_url.clone());

                let content = extract(&page.body, &page.content_type, Some(&page.final_url));
                result.image_tags = content.image_tags;
                result.anchor_tags = content.anchor_tags;

                if let Some(parse_error) = content.error {
                    result.error = Some(parse_error);
                } else if content.text.is_empty() {
                    // Static extraction failed — likely a JS-rendered page.
                    match self.render_fallback(&sanitized_url).await {
                        Some(text) => result.text = Some(text),
                        None => {
                            result.error =
                                Some(format!("No visible text extracted from {sanitized_url}"))
                        }
                    }
                } else {
                    result.text = Some(content.text);
                }
            }
            Err(fetch_error) => {
                warn!(url = %sanitized_url, error = %fetch_error, "Static fetch failed");
                match self.render_fallback(&sanitized_url).await {
                    Some(text) => result.text = Some(text),
                    None => result.error = Some(fetch_error.to_string()),
                }
            }
        }

        let result = result.finalize();
        info!(
            url,
            is_reachable = result.is_reachable,
            text_len = result.text.as_deref().map(str::len).unwrap_or(0),
            "Scrape complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use webgrab_common::{AnchorTag, FetchError};

    use crate::testing::{html_page, MockPageFetcher, MockRenderer};

    #[tokio::test]
    async fn scrape_extracts_text_and_anchors_end_to_end() {
        let fetcher = MockPageFetcher::new().on_page(
            "https://example.com",
            html_page(
                "https://example.com",
                "<html><body><p>Hello World</p><a href=\"/about\">About</a></body></html>",
            ),
        );
        let scraper = Scraper::new(Arc::new(fetcher));

        let result = scraper.scrape("example.com").await;

        assert_eq!(result.url, "example.com");
        assert_eq!(result.sanitized_url, "https://example.com");
        assert_eq!(result.redirected_url.as_deref(), Some("https://example.com"));
        // Anchor text is body text and counts as visible.
        assert_eq!(result.text.as_deref(), Some("Hello World About"));
        assert_eq!(
            result.anchor_tags,
            vec![AnchorTag {
                href: "https://example.com/about".to_string()
            }]
        );
        assert!(result.error.is_none());
        assert!(result.is_reachable);
    }

    #[tokio::test]
    async fn fetch_error_is_embedded_not_raised() {
        let fetcher = MockPageFetcher::new().on_error(
            "https://down.example.com",
            FetchError::HttpStatus {
                url: "https://down.example.com".to_string(),
                status: 500,
            },
        );
        let scraper = Scraper::new(Arc::new(fetcher));

        let result = scraper.scrape("down.example.com").await;

        assert!(!result.is_reachable);
        assert!(result.text.is_none());
        assert!(result.error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn empty_static_text_triggers_render_fallback() {
        let fetcher = MockPageFetcher::new().on_page(
            "https://app.example.com",
            html_page(
                "https://app.example.com",
                "<html><body><div id=\"root\"></div></body></html>",
            ),
        );
        let renderer = MockRenderer::new().on_render("https://app.example.com", "Rendered text");
        let scraper = Scraper::new(Arc::new(fetcher)).with_renderer(Arc::new(renderer));

        let result = scraper.scrape("app.example.com").await;

        assert_eq!(result.text.as_deref(), Some("Rendered text"));
        assert!(result.error.is_none());
        assert!(result.is_reachable);
    }

    #[tokio::test]
    async fn empty_static_text_without_renderer_is_unreachable() {
        let fetcher = MockPageFetcher::new().on_page(
            "https://app.example.com",
            html_page(
                "https://app.example.com",
                "<html><body><div id=\"root\"></div></body></html>",
            ),
        );
        let scraper = Scraper::new(Arc::new(fetcher));

        let result = scraper.scrape("app.example.com").await;

        assert!(!result.is_reachable);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_renderer() {
        let fetcher = MockPageFetcher::new().on_error(
            "https://blocked.example.com",
            FetchError::Connection {
                url: "https://blocked.example.com".to_string(),
                message: "refused".to_string(),
            },
        );
        let renderer =
            MockRenderer::new().on_render("https://blocked.example.com", "Browser got through");
        let scraper = Scraper::new(Arc::new(fetcher)).with_renderer(Arc::new(renderer));

        let result = scraper.scrape("blocked.example.com").await;

        assert_eq!(result.text.as_deref(), Some("Browser got through"));
        assert!(result.is_reachable);
    }

    #[tokio::test]
    async fn reachability_invariant_holds_in_all_outcomes() {
        let fetcher = MockPageFetcher::new()
            .on_page(
                "https://ok.example.com",
                html_page("https://ok.example.com", "<p>content</p>"),
            )
            .on_error(
                "https://err.example.com",
                FetchError::Timeout {
                    url: "https://err.example.com".to_string(),
                    message: "deadline".to_string(),
                },
            );
        let scraper = Scraper::new(Arc::new(fetcher));

        for url in ["ok.example.com", "err.example.com", "unregistered.example.com"] {
            let result = scraper.scrape(url).await;
            let expected =
                result.error.is_none() && result.text.as_deref().is_some_and(|t| !t.is_empty());
            assert_eq!(result.is_reachable, expected, "invariant broken for {url}");
        }
    }
}
