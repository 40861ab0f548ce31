pub mod deep_search;
pub mod extract;
pub mod fetch;
pub mod render;
pub mod sanitize;
pub mod scrape;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use deep_search::DeepSearch;
pub use extract::{extract, ExtractedContent};
pub use fetch::{FetchedPage, Fetcher, PageFetcher};
pub use render::{BrowserlessRenderer, DynamicRenderer};
pub use sanitize::sanitize;
pub use scrape::{PageScraper, Scraper};
pub use search::{BraveSearch, DuckDuckGoSearch, GoogleSearch, SearchProvider};

pub use webgrab_common::{AnchorTag, Config, FetchError, ImageTag, ScrapeResult, SearchResult};
