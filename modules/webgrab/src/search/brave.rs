use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use webgrab_common::{Config, SearchResult};

use crate::search::SearchProvider;

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search API. The subscription key travels as the
/// `X-Subscription-Token` header, never as a query parameter. A result's
/// `body` is its description plus any extra snippets joined together.
pub struct BraveSearch {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl BraveSearch {
    /// `api_key` may come from the caller directly; [`BraveSearch::from_config`]
    /// is the fallback resolution path.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { api_key, client }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.brave_api_key.clone())
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let Some(api_key) = self.api_key.as_deref() else {
            anyhow::bail!("Brave API key missing");
        };

        let count = max_results.clamp(1, 20).to_string();
        let resp = self
            .client
            .get(BRAVE_API_URL)
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .context("Brave API request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("Brave API responded with status {}", resp.status());
        }

        let data: BraveResponse = resp
            .json()
            .await
            .context("Failed to parse Brave response")?;

        let mut results: Vec<SearchResult> = data
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .map(to_search_result)
            .collect();
        results.truncate(max_results);
        Ok(results)
    }
}

#[async_trait]
impl SearchProvider for BraveSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        info!(query, max_results, "Brave search");
        match self.try_search(query, max_results).await {
            Ok(results) => {
                info!(query, count = results.len(), "Brave search complete");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "Brave search failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "brave"
    }
}

fn to_search_result(result: BraveResult) -> SearchResult {
    let mut body = result.description;
    if !result.extra_snippets.is_empty() {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str(&result.extra_snippets.join(" "));
    }

    SearchResult {
        title: result.title,
        href: result.url,
        body,
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    extra_snippets: Vec<String>,
}
