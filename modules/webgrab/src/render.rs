use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use browserless_client::BrowserlessClient;

use crate::extract;

/// Dynamic render fallback: drives a headless browser when static extraction
/// yields no usable text (JS-rendered pages). Empty string means the render
/// failed to produce text; errors are reserved for transport-level failures.
#[async_trait]
pub trait DynamicRenderer: Send + Sync {
    async fn render(&self, url: &str, user_agent: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Renderer backed by a Browserless-style /content service: fetch the
/// post-JavaScript DOM, then run the same visible-text extraction as the
/// static path.
pub struct BrowserlessRenderer {
    client: BrowserlessClient,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        info!(base_url, "Using BrowserlessRenderer");
        Self {
            client: BrowserlessClient::new(base_url, token),
        }
    }
}

#[async_trait]
impl DynamicRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str, user_agent: &str) -> Result<String> {
        info!(url, renderer = "browserless", "Rendering URL");

        let html = self
            .client
            .content(url, Some(user_agent))
            .await
            .context("Browserless content request failed")?;

        if html.is_empty() {
            warn!(url, renderer = "browserless", "Empty HTML response");
            return Ok(String::new());
        }

        let content = extract::extract(html.as_bytes(), "text/html", Some(url));
        if content.text.is_empty() {
            warn!(url, renderer = "browserless", "No visible text after render");
            return Ok(String::new());
        }

        info!(
            url,
            renderer = "browserless",
            bytes = content.text.len(),
            "Rendered successfully"
        );
        Ok(content.text)
    }

    fn name(&self) -> &str {
        "browserless"
    }
}
