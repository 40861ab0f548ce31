use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An `<img>` element with both `alt` and `src` attributes present.
/// Elements missing either attribute are never emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTag {
    pub alt: String,
    pub src: String,
}

/// An outbound link extracted from a page. `href` is absolute where a base
/// URL was known, with any trailing slash stripped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorTag {
    pub href: String,
}

/// One normalized search-engine hit. All providers map their native fields
/// into this shape; `body` holds the provider snippet until deep search
/// replaces it with scraped page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// The output record of one scrape call. Created fresh per call; the caller
/// owns its lifecycle. `is_reachable` always equals
/// `error.is_none() && text is non-empty` — use [`ScrapeResult::finalize`]
/// after filling in `text`/`error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub sanitized_url: String,
    pub redirected_url: Option<String>,
    pub text: Option<String>,
    pub image_tags: Vec<ImageTag>,
    pub anchor_tags: Vec<AnchorTag>,
    pub error: Option<String>,
    pub is_reachable: bool,
    pub scraped_on: DateTime<Utc>,
}

impl ScrapeResult {
    pub fn new(url: &str, sanitized_url: &str) -> Self {
        Self {
            url: url.to_string(),
            sanitized_url: sanitized_url.to_string(),
            redirected_url: None,
            text: None,
            image_tags: Vec::new(),
            anchor_tags: Vec::new(),
            error: None,
            is_reachable: false,
            scraped_on: Utc::now(),
        }
    }

    /// Recompute `is_reachable` from the error and text fields.
    pub fn finalize(mut self) -> Self {
        self.is_reachable =
            self.error.is_none() && self.text.as_deref().is_some_and(|t| !t.is_empty());
        self
    }
}
