use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use webgrab_common::SearchResult;

use crate::fetch::DEFAULT_USER_AGENTS;
use crate::search::SearchProvider;

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Keyword search over DuckDuckGo's HTML endpoint. No credentials; safesearch
/// disabled via `kp=-2`. Results come back as server-rendered HTML and are
/// parsed with the same selectors the endpoint has used for years.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }

    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let resp = self
            .client
            .get(DDG_HTML_URL)
            .query(&[("q", query), ("kp", "-2")])
            .header(USER_AGENT, DEFAULT_USER_AGENTS[0])
            .send()
            .await
            .context("DuckDuckGo request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("DuckDuckGo responded with status {}", resp.status());
        }

        let html = resp
            .text()
            .await
            .context("Failed to read DuckDuckGo response")?;

        Ok(parse_results(&html, max_results))
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        info!(query, max_results, "DuckDuckGo search");
        match self.try_search(query, max_results).await {
            Ok(results) => {
                info!(query, count = results.len(), "DuckDuckGo search complete");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "DuckDuckGo search failed");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result").expect("valid selector");
    let title_selector = Selector::parse(".result__a").expect("valid selector");
    let snippet_selector = Selector::parse(".result__snippet").expect("valid selector");

    let mut results = Vec::new();
    for element in document.select(&result_selector) {
        let Some(anchor) = element.select(&title_selector).next() else {
            continue;
        };
        let href = unwrap_redirect(anchor.value().attr("href").unwrap_or_default().trim());
        if !href.starts_with("http") {
            continue;
        }

        let title = anchor.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let body = element
            .select(&snippet_selector)
            .next()
            .map(|s| s.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(SearchResult { title, href, body });
        if results.len() >= max_results {
            break;
        }
    }

    results
}

/// DuckDuckGo wraps result links in `//duckduckgo.com/l/?uddg=<encoded>`
/// redirects; unwrap to the target URL when present.
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
                return target.into_owned();
            }
        }
    }

    absolute
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="results">
          <div class="result">
            <h2 class="result__title">
              <a class="result__a" href="https://example.com/one">First result</a>
            </h2>
            <a class="result__snippet">Snippet one</a>
          </div>
          <div class="result">
            <h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Ftwo&amp;rut=abc">Second result</a>
            </h2>
            <a class="result__snippet">Snippet two</a>
          </div>
          <div class="result">
            <h2 class="result__title">
              <a class="result__a" href="/relative">Not a real hit</a>
            </h2>
          </div>
        </div>"#;

    #[test]
    fn parses_results_and_unwraps_redirects() {
        let results = parse_results(SAMPLE, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First result");
        assert_eq!(results[0].href, "https://example.com/one");
        assert_eq!(results[0].body, "Snippet one");
        assert_eq!(results[1].href, "https://example.com/two");
    }

    #[test]
    fn respects_max_results() {
        let results = parse_results(SAMPLE, 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn empty_page_yields_no_results() {
        assert!(parse_results("<html><body></body></html>", 10).is_empty());
    }

    #[test]
    fn unwrap_redirect_passes_plain_urls_through() {
        assert_eq!(
            unwrap_redirect("https://example.com/page"),
            "https://example.com/page"
        );
    }
}
