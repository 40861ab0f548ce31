// Test mocks for the scrape and search pipelines.
//
// One mock per trait boundary:
// - MockPageFetcher (PageFetcher) — HashMap-based URL→page/error
// - MockPageScraper (PageScraper) — HashMap-based URL→text
// - MockSearchProvider (SearchProvider) — HashMap-based query→results
// - MockRenderer (DynamicRenderer) — HashMap-based URL→rendered text
//
// All builders follow the `.on_*()` pattern; unregistered lookups behave
// like the real failure mode (connection error, empty results).

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use webgrab_common::{FetchError, ScrapeResult, SearchResult};

use crate::fetch::{FetchedPage, PageFetcher};
use crate::render::DynamicRenderer;
use crate::scrape::PageScraper;
use crate::search::SearchProvider;

/// Build a `FetchedPage` for an HTML body served at `url` with no redirect.
pub fn html_page(url: &str, html: &str) -> FetchedPage {
    FetchedPage {
        url: url.to_string(),
        final_url: url.to_string(),
        status: 200,
        content_type: "text/html; charset=utf-8".to_string(),
        body: Bytes::from(html.to_string()),
    }
}

// ---------------------------------------------------------------------------
// MockPageFetcher
// ---------------------------------------------------------------------------

/// HashMap-based page fetcher. Unregistered URLs get a connection error,
/// matching how an unreachable host behaves.
pub struct MockPageFetcher {
    pages: HashMap<String, FetchedPage>,
    errors: HashMap<String, FetchError>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn on_page(mut self, url: &str, page: FetchedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn on_error(mut self, url: &str, error: FetchError) -> Self {
        self.errors.insert(url.to_string(), error);
        self
    }
}

impl Default for MockPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if let Some(error) = self.errors.get(url) {
            return Err(error.clone());
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Connection {
                url: url.to_string(),
                message: "no mock registered".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// MockPageScraper
// ---------------------------------------------------------------------------

/// HashMap-based scraper for combinator tests. Registered URLs come back
/// reachable with the given text (empty text means an unreadable page);
/// unregistered URLs come back unreachable with an error.
pub struct MockPageScraper {
    texts: HashMap<String, String>,
}

impl MockPageScraper {
    pub fn new() -> Self {
        Self {
            texts: HashMap::new(),
        }
    }

    pub fn on_text(mut self, url: &str, text: &str) -> Self {
        self.texts.insert(url.to_string(), text.to_string());
        self
    }
}

impl Default for MockPageScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageScraper for MockPageScraper {
    async fn scrape(&self, url: &str) -> ScrapeResult {
        let mut result = ScrapeResult::new(url, url);
        match self.texts.get(url) {
            Some(text) if !text.is_empty() => result.text = Some(text.clone()),
            Some(_) => result.error = Some(format!("No visible text extracted from {url}")),
            None => {
                result.error = Some(format!("Connection error fetching {url}: no mock registered"))
            }
        }
        result.finalize()
    }
}

// ---------------------------------------------------------------------------
// MockSearchProvider
// ---------------------------------------------------------------------------

/// HashMap-based search provider. Unregistered queries return empty results,
/// matching the fail-closed provider contract.
pub struct MockSearchProvider {
    results: HashMap<String, Vec<SearchResult>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
        }
    }

    pub fn on_query(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let mut results = self.results.get(query).cloned().unwrap_or_default();
        results.truncate(max_results);
        results
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockRenderer
// ---------------------------------------------------------------------------

/// HashMap-based dynamic renderer. Unregistered URLs render to an empty
/// string, the renderer's own "no text" failure mode.
pub struct MockRenderer {
    texts: HashMap<String, String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            texts: HashMap::new(),
        }
    }

    pub fn on_render(mut self, url: &str, text: &str) -> Self {
        self.texts.insert(url.to_string(), text.to_string());
        self
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DynamicRenderer for MockRenderer {
    async fn render(&self, url: &str, _user_agent: &str) -> Result<String> {
        Ok(self.texts.get(url).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
