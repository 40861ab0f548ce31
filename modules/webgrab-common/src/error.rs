use thiserror::Error;

/// Transport-level failure from one fetch attempt. Each variant carries the
/// requested URL so callers can log a diagnosable message without extra
/// bookkeeping. Fetch errors never cross the public scrape boundary — they
/// are folded into `ScrapeResult::error`.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Timeout fetching {url}: {message}")]
    Timeout { url: String, message: String },

    #[error("Connection error fetching {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Unknown error fetching {url}: {message}")]
    Unknown { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was made to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::HttpStatus { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Connection { url, .. }
            | FetchError::Unknown { url, .. } => url,
        }
    }
}
