//! Crawler module for fetching and processing search result pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with browser-like headers
//! - Listing extraction across several page layouts
//! - Request pacing
//! - Handing classified postings to a sink
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;
mod sink;

pub use coordinator::{run_crawl, CrawlTally, Crawler};
pub use extractor::extract_postings;
pub use fetcher::{
    build_http_client, fetch_page, FetchResult, NetworkErrorKind, DEFAULT_USER_AGENT,
};
pub use scheduler::RequestPacer;
pub use sink::{PostingSink, RepositorySink};
