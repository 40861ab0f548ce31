use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::{info, warn};

use webgrab_common::SearchResult;

use crate::scrape::PageScraper;
use crate::search::SearchProvider;

/// Concurrent scrapes per deep-search call. Bounded to stay polite toward
/// result hosts and within provider-side rate limits.
const SCRAPE_CONCURRENCY: usize = 5;

/// Search results enriched with full scraped page text in place of the
/// provider's short snippet. A hit is only useful downstream once its
/// content is confirmed readable, so results whose scrape yields no text
/// are dropped from the output.
pub struct DeepSearch {
    provider: Arc<dyn SearchProvider>,
    scraper: Arc<dyn PageScraper>,
}

impl DeepSearch {
    pub fn new(provider: Arc<dyn SearchProvider>, scraper: Arc<dyn PageScraper>) -> Self {
        Self { provider, scraper }
    }

    /// Run one provider query, then fan out one scrape per result. Output
    /// follows the provider's ranking, minus omissions; a failed or empty
    /// scrape never blocks or fails its siblings.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let results = self.provider.search(query, max_results).await;
        info!(
            query,
            provider = self.provider.name(),
            count = results.len(),
            "Deep search: enriching provider results"
        );

        let mut enriched: Vec<(usize, Option<SearchResult>)> =
            stream::iter(results.into_iter().enumerate().map(|(rank, result)| {
                let scraper = Arc::clone(&self.scraper);
                async move {
                    if result.href.is_empty() {
                        return (rank, None);
                    }
                    let scraped = scraper.scrape(&result.href).await;
                    match scraped.text {
                        Some(text) if !text.is_empty() => {
                            (rank, Some(SearchResult { body: text, ..result }))
                        }
                        _ => {
                            warn!(
                                href = %result.href,
                                error = ?scraped.error,
                                "Deep search: dropping result with no readable content"
                            );
                            (rank, None)
                        }
                    }
                }
            }))
            .buffer_unordered(SCRAPE_CONCURRENCY)
            .collect()
            .await;

        enriched.sort_by_key(|(rank, _)| *rank);
        let output: Vec<SearchResult> = enriched
            .into_iter()
            .filter_map(|(_, result)| result)
            .collect();

        info!(query, count = output.len(), "Deep search complete");
        output
    }
}
