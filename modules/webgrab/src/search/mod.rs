pub mod brave;
pub mod duckduckgo;
pub mod google;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;
pub use google::GoogleSearch;

use async_trait::async_trait;

use webgrab_common::SearchResult;

/// A search provider normalized to the common [`SearchResult`] shape.
/// Implementations never raise past this boundary: rate limiting, timeouts,
/// malformed responses, and missing credentials all collapse to an empty
/// result list plus a logged diagnostic.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult>;

    fn name(&self) -> &'static str;
}
