use crate::posting::SearchSpec;
use serde::Deserialize;

/// Main configuration structure for Job-Ripple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
    /// Extra entries appended to the built-in keyword dictionary
    #[serde(default, rename = "keyword")]
    pub keywords: Vec<KeywordEntry>,
}

impl Config {
    /// Builds the search spec a crawl of this configuration runs
    pub fn search_spec(&self) -> SearchSpec {
        SearchSpec::new(
            self.search.keywords.clone(),
            self.search.locations.clone(),
            self.crawler.max_pages,
        )
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of search pages fetched per (keyword, location) pair
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Fixed delay between consecutive requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Overrides the browser user agent sent with every request
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

/// Target site description
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Source name recorded on every stored posting
    pub name: String,

    /// Scheme and host of the site (e.g. "https://www.example.com")
    pub origin: String,

    /// Path of the search endpoint
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Query parameter carrying the search keyword
    #[serde(rename = "keyword-param", default = "default_keyword_param")]
    pub keyword_param: String,

    /// Query parameter carrying the search location
    #[serde(rename = "location-param", default = "default_location_param")]
    pub location_param: String,

    /// Query parameter carrying the result offset
    #[serde(rename = "offset-param", default = "default_offset_param")]
    pub offset_param: String,
}

/// Search terms crawled on every run
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown digest file
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,

    /// Days without a sighting before a posting is marked inactive
    #[serde(rename = "staleness-days", default = "default_staleness_days")]
    pub staleness_days: u32,
}

/// A dictionary entry mapping spelling variants to one canonical keyword
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordEntry {
    pub canonical: String,
    pub variants: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

fn default_keyword_param() -> String {
    "q".to_string()
}

fn default_location_param() -> String {
    "l".to_string()
}

fn default_offset_param() -> String {
    "start".to_string()
}

fn default_summary_path() -> String {
    "./postings.md".to_string()
}

fn default_staleness_days() -> u32 {
    7
}
