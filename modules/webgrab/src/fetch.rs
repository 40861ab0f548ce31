use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, warn};

use webgrab_common::FetchError;

/// Rotation pool of desktop User-Agents. Picking one at random per request
/// avoids the most trivial bot blocking.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36",
    "Mozilla/5.0 (Platform; Security; OS-or-CPU; Localization; rv:1.4) Gecko/20030624 Netscape/7.1 (ax)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.81 Safari/537.3",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.97 Safari/537.3",
];

const SESSION_COOKIE: &str = "session_id=1234567890";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// One successfully fetched page: final post-redirect URL, status, declared
/// content type, and the raw body bytes.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

// --- PageFetcher trait ---

/// Trait seam over HTTP fetching so the scrape pipeline and tests can
/// substitute a mock (no network in `cargo test`).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// User-Agent to hand to the dynamic render fallback.
    fn user_agent(&self) -> String {
        DEFAULT_USER_AGENTS[0].to_string()
    }
}

// --- HTTP fetcher ---

/// Static HTTP fetcher: randomized User-Agent, fixed session cookie,
/// transparent redirect following, TLS verification on. Does not retry —
/// retries are a caller concern.
pub struct Fetcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_user_agents(
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Build a fetcher with a custom rotation pool and per-request timeout.
    /// The pool is immutable after construction.
    pub fn with_user_agents(user_agents: Vec<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            user_agents,
        }
    }

    fn random_user_agent(&self) -> &str {
        if self.user_agents.is_empty() {
            return DEFAULT_USER_AGENTS[0];
        }
        let idx = rand::rng().random_range(0..self.user_agents.len());
        &self.user_agents[idx]
    }

    /// Default headers plus caller-supplied extras. Extras override defaults
    /// key-by-key; nothing is discarded.
    fn build_headers(&self, extra: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(ua) = HeaderValue::from_str(self.random_user_agent()) {
            headers.insert(USER_AGENT, ua);
        }
        headers.insert(COOKIE, HeaderValue::from_static(SESSION_COOKIE));

        for (name, value) in extra {
            let Ok(name) = name.parse::<HeaderName>() else {
                warn!(header = name, "Skipping invalid header name");
                continue;
            };
            let Ok(value) = HeaderValue::from_str(value) else {
                warn!(header = %name, "Skipping invalid header value");
                continue;
            };
            headers.insert(name, value);
        }

        headers
    }

    /// GET a URL with default headers and no extra query parameters.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetch_with(url, &[], &[]).await
    }

    /// GET a URL, merging caller-supplied query parameters and headers over
    /// the defaults. On any transport failure or non-2xx status the caller
    /// gets a classified [`FetchError`] and no partial response.
    pub async fn fetch_with(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<FetchedPage, FetchError> {
        debug!(url, "Fetching URL");

        let resp = self
            .client
            .get(url)
            .headers(self.build_headers(headers))
            .query(params)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        let final_url = resp.url().to_string();

        if let Some(err) = status_error(url, status) {
            warn!(url, status = status.as_u16(), "Fetch returned error status");
            return Err(err);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = resp.bytes().await.map_err(|e| classify(url, e))?;

        debug!(url, final_url, bytes = body.len(), "Fetched successfully");
        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Reachability probe: true when a plain GET succeeds.
    pub async fn exists(&self, url: &str) -> bool {
        self.fetch(url).await.is_ok()
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        Fetcher::fetch(self, url).await
    }

    fn user_agent(&self) -> String {
        self.random_user_agent().to_string()
    }
}

/// Map a non-2xx status to the corresponding fetch error.
fn status_error(url: &str, status: StatusCode) -> Option<FetchError> {
    if status.is_success() {
        return None;
    }
    Some(FetchError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
    })
}

/// Classify a transport failure into the fetch error taxonomy.
fn classify(url: &str, err: reqwest::Error) -> FetchError {
    let url = url.to_string();
    let message = err.to_string();
    if err.is_timeout() {
        FetchError::Timeout { url, message }
    } else if err.is_connect() {
        FetchError::Connection { url, message }
    } else {
        FetchError::Unknown { url, message }
    }
}
