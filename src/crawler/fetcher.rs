//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building an HTTP client that presents itself as a desktop browser
//! - GET requests for search result pages
//! - Error classification
//!
//! There is no internal retry. A failed fetch is reported to the caller,
//! which decides what to abandon.

use crate::config::CrawlerConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;

/// User agent sent when the configuration does not override it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Kind of network-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    /// Redirect loop or too many hops
    Redirect,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Redirect => "redirect",
            NetworkErrorKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        kind: NetworkErrorKind,
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }

    /// Short human-readable description of a failed fetch
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            FetchResult::Success { .. } => None,
            FetchResult::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            FetchResult::NetworkError { kind, error } => Some(format!("{} error: {}", kind, error)),
        }
    }
}

/// Builds an HTTP client with browser-like headers
///
/// # Arguments
///
/// * `config` - The crawler configuration (timeout, redirect limit, user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use job_ripple::config::CrawlerConfig;
/// use job_ripple::crawler::build_http_client;
///
/// let config = CrawlerConfig {
///     max_pages: 3,
///     request_delay_ms: 2000,
///     timeout_secs: 10,
///     max_redirects: 5,
///     user_agent: None,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let user_agent = config
        .user_agent
        .as_deref()
        .unwrap_or(DEFAULT_USER_AGENT)
        .to_string();

    Client::builder()
        .user_agent(user_agent)
        .default_headers(default_headers())
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Fetches one page
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success with body |
/// | Any other status | HttpError |
/// | Timeout | NetworkError(Timeout) |
/// | Connection refused / TLS | NetworkError(Connect) |
/// | Redirect loop or chain too long | NetworkError(Redirect) |
/// | Body read failure | NetworkError(Other) |
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => network_error(&e),
            }
        }
        Err(e) => network_error(&e),
    }
}

fn network_error(e: &reqwest::Error) -> FetchResult {
    let kind = if e.is_timeout() {
        NetworkErrorKind::Timeout
    } else if e.is_connect() {
        NetworkErrorKind::Connect
    } else if e.is_redirect() {
        NetworkErrorKind::Redirect
    } else {
        NetworkErrorKind::Other
    };

    FetchResult::NetworkError {
        kind,
        error: e.to_string(),
    }
}
