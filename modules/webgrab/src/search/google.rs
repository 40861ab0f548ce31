use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use webgrab_common::{Config, SearchResult};

use crate::search::SearchProvider;

const CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search JSON API. Requires both an API key and a search
/// engine (context) identifier; when either is missing every query returns
/// empty results rather than failing the process.
pub struct GoogleSearch {
    api_key: Option<String>,
    search_engine_id: Option<String>,
    start: u32,
    sort: Option<String>,
    client: reqwest::Client,
}

impl GoogleSearch {
    pub fn new(api_key: Option<String>, search_engine_id: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            api_key,
            search_engine_id,
            start: 1,
            sort: None,
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.google_api_key.clone(),
            config.google_search_engine_id.clone(),
        )
    }

    /// Pagination offset of the first result (1-based, API default).
    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    /// Result sort expression, e.g. `"date"`.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let (Some(api_key), Some(search_engine_id)) =
            (self.api_key.as_deref(), self.search_engine_id.as_deref())
        else {
            anyhow::bail!("Google search credentials missing (api_key and search_engine_id required)");
        };

        // The API caps num at 10 per request.
        let num = max_results.clamp(1, 10).to_string();
        let start = self.start.to_string();
        let mut params = vec![
            ("key", api_key),
            ("cx", search_engine_id),
            ("q", query),
            ("num", num.as_str()),
            ("start", start.as_str()),
        ];
        if let Some(sort) = self.sort.as_deref() {
            params.push(("sort", sort));
        }

        let resp = self
            .client
            .get(CSE_URL)
            .query(&params)
            .send()
            .await
            .context("Google search request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Google search responded with status {}", resp.status());
        }

        let data: GoogleResponse = resp
            .json()
            .await
            .context("Failed to parse Google search response")?;

        let mut results: Vec<SearchResult> = data
            .items
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                href: item.link,
                body: item.snippet,
            })
            .collect();
        results.truncate(max_results);
        Ok(results)
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        info!(query, max_results, "Google search");
        match self.try_search(query, max_results).await {
            Ok(results) => {
                info!(query, count = results.len(), "Google search complete");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "Google search failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_fail_closed() {
        let provider = GoogleSearch::new(None, None);
        assert!(provider.search("anything", 5).await.is_empty());

        let provider = GoogleSearch::new(Some("key".to_string()), None);
        assert!(provider.search("anything", 5).await.is_empty());
    }

    #[test]
    fn response_maps_title_link_snippet() {
        let json = r#"{
            "items": [
                {"title": "A page", "link": "https://example.com/a", "snippet": "About a"},
                {"title": "B page", "link": "https://example.com/b", "snippet": "About b"}
            ]
        }"#;
        let data: GoogleResponse = serde_json::from_str(json).unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[0].title, "A page");
        assert_eq!(data.items[0].link, "https://example.com/a");
        assert_eq!(data.items[1].snippet, "About b");
    }

    #[test]
    fn response_without_items_deserializes_empty() {
        let data: GoogleResponse = serde_json::from_str("{}").unwrap();
        assert!(data.items.is_empty());
    }
}
