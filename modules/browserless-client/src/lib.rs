pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a Browserless-style rendering service. Used as the dynamic
/// fallback when static fetching yields no usable content — the service
/// drives a headless browser and returns the post-JavaScript DOM.
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
    goto_options: GotoOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GotoOptions<'a> {
    wait_until: &'a str,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: Option<&str>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML for a URL via the /content endpoint,
    /// waiting for the network to go idle so JS-rendered markup is present.
    /// `user_agent` overrides the browser's default UA when given.
    pub async fn content(&self, url: &str, user_agent: Option<&str>) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let body = ContentRequest {
            url,
            user_agent,
            goto_options: GotoOptions {
                wait_until: "networkidle2",
            },
        };

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_request_serializes_camel_case() {
        let body = ContentRequest {
            url: "https://example.com",
            user_agent: Some("TestAgent/1.0"),
            goto_options: GotoOptions {
                wait_until: "networkidle2",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["url"], "https://example.com");
        assert_eq!(json["userAgent"], "TestAgent/1.0");
        assert_eq!(json["gotoOptions"]["waitUntil"], "networkidle2");
    }

    #[test]
    fn content_request_omits_missing_user_agent() {
        let body = ContentRequest {
            url: "https://example.com",
            user_agent: None,
            goto_options: GotoOptions {
                wait_until: "networkidle2",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("userAgent").is_none());
    }
}
