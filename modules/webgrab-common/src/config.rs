use std::env;

/// Process-wide configuration, read once at startup and immutable after.
/// Every field is optional: providers with missing credentials fail closed
/// (empty results) rather than aborting, and the render fallback is simply
/// disabled when no Browserless endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct Config {
    // Google Custom Search
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,

    // Brave Search
    pub brave_api_key: Option<String>,

    // Dynamic render fallback
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables. Absent or empty
    /// variables become `None`.
    pub fn from_env() -> Self {
        Self {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            google_search_engine_id: optional_env("GOOGLE_SEARCH_ENGINE_ID"),
            brave_api_key: optional_env("BRAVE_SEARCH_API_KEY"),
            browserless_url: optional_env("BROWSERLESS_URL"),
            browserless_token: optional_env("BROWSERLESS_TOKEN"),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
