//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives every (keyword, location)
//! search through its result pages, including:
//! - Pacing requests with a fixed delay
//! - Fetching and extracting each page
//! - Classifying postings and handing them to a sink
//! - Isolating failures to the search that hit them
//! - Recording each host-level run in the repository

use crate::classifier::Classifier;
use crate::config::{Config, SiteConfig};
use crate::crawler::extractor::extract_postings;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::crawler::scheduler::RequestPacer;
use crate::crawler::sink::{lock_repository, PostingSink, RepositorySink};
use crate::posting::SearchSpec;
use crate::storage::{open_repository, Repository, RunRecord, RunStatus};
use crate::url::{build_search_url, parse_origin};
use crate::RippleError;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use url::Url;

/// Totals of one crawl
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlTally {
    /// Postings extracted, whether or not the sink accepted them
    pub postings: usize,
    /// Search pages fetched successfully
    pub pages_fetched: usize,
}

/// Drives searches against one site
pub struct Crawler {
    client: Client,
    site: SiteConfig,
    origin: Url,
    classifier: Arc<Classifier>,
    pacer: RequestPacer,
}

impl Crawler {
    /// Creates a new crawler instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `classifier` - Shared, immutable classifier
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Successfully created crawler
    /// * `Err(RippleError)` - Invalid origin or HTTP client failure
    pub fn new(config: &Config, classifier: Arc<Classifier>) -> Result<Self, RippleError> {
        let client = build_http_client(&config.crawler)?;
        let origin = parse_origin(&config.site.origin)?;

        Ok(Self {
            client,
            site: config.site.clone(),
            origin,
            classifier,
            pacer: RequestPacer::from_millis(config.crawler.request_delay_ms),
        })
    }

    /// Runs every search in `spec` and hands each posting to `sink`
    ///
    /// Keywords form the outer loop and locations the inner loop. A failed
    /// fetch abandons the remaining pages of that search only. Sink errors
    /// are logged and the posting still counts as seen.
    ///
    /// # Returns
    ///
    /// The total number of postings seen
    pub async fn crawl(&mut self, spec: &SearchSpec, sink: &dyn PostingSink) -> usize {
        self.crawl_tally(spec, sink).await.postings
    }

    /// Same as [`Crawler::crawl`], also reporting how many pages were fetched
    pub async fn crawl_tally(&mut self, spec: &SearchSpec, sink: &dyn PostingSink) -> CrawlTally {
        let start_time = Instant::now();
        let mut total = CrawlTally::default();

        for keyword in &spec.keywords {
            for location in &spec.locations {
                let search = self
                    .crawl_search(keyword, location, spec.max_pages, sink)
                    .await;
                tracing::info!(
                    "Search '{}' in '{}': {} postings",
                    keyword,
                    location,
                    search.postings
                );
                total.postings += search.postings;
                total.pages_fetched += search.pages_fetched;
            }
        }

        tracing::info!(
            "Crawl finished: {} postings from {} pages across {} searches in {:?}",
            total.postings,
            total.pages_fetched,
            spec.pair_count(),
            start_time.elapsed()
        );

        total
    }

    /// Crawls the result pages of one (keyword, location) search
    async fn crawl_search(
        &mut self,
        keyword: &str,
        location: &str,
        max_pages: u32,
        sink: &dyn PostingSink,
    ) -> CrawlTally {
        let mut tally = CrawlTally::default();

        for page_index in 0..max_pages {
            let url = match build_search_url(&self.site, keyword, location, page_index) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Cannot build search URL for '{}' in '{}': {}", keyword, location, e);
                    break;
                }
            };

            self.pacer.wait_turn().await;
            tracing::debug!("Fetching {}", url);

            let body = match fetch_page(&self.client, url.as_str()).await {
                FetchResult::Success { body, .. } => body,
                failure => {
                    self.pacer.mark_finished();
                    tracing::warn!(
                        "Fetch of page {} for '{}' in '{}' failed ({}); skipping remaining pages",
                        page_index + 1,
                        keyword,
                        location,
                        failure.failure_reason().unwrap_or_default()
                    );
                    break;
                }
            };

            tally.pages_fetched += 1;
            let postings = extract_postings(&body, &self.origin);
            if postings.is_empty() {
                tracing::warn!("No postings extracted from {}", url);
            } else {
                tracing::debug!("Extracted {} postings from {}", postings.len(), url);
            }

            for raw in postings {
                let posting = self.classifier.classify(raw);
                if let Err(e) = sink.persist(&self.site.name, &posting).await {
                    tracing::warn!("Failed to persist {}: {}", posting.url, e);
                }
                tally.postings += 1;
            }

            self.pacer.mark_finished();
        }

        tally
    }
}

/// Runs a complete crawl and records it in the repository
///
/// This is the host-level entry point. It will:
/// 1. Build the classifier and crawler
/// 2. Open the repository and record a new run
/// 3. Crawl every configured search into the repository
/// 4. Complete the run with its posting count
///
/// A run that fetched pages but extracted nothing still completes, with a
/// warning: it usually means the site changed its markup. A run in which
/// every fetch failed is recorded as failed.
///
/// # Example
///
/// ```no_run
/// use job_ripple::config::load_config_with_hash;
/// use job_ripple::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let run = run_crawl(&config, &hash).await?;
/// println!("{} postings", run.posting_count);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, config_hash: &str) -> Result<RunRecord, RippleError> {
    let classifier = Arc::new(Classifier::with_entries(&config.keywords)?);
    let mut crawler = Crawler::new(config, classifier)?;

    let repository = Arc::new(Mutex::new(open_repository(&config.output)?));
    let run_id = lock_repository(&repository)?.create_run(config_hash)?;

    let spec = config.search_spec();
    tracing::info!(
        "Starting crawl run {}: {} searches, up to {} requests",
        run_id,
        spec.pair_count(),
        spec.max_requests()
    );

    let sink = RepositorySink::new(Arc::clone(&repository));
    let tally = crawler.crawl_tally(&spec, &sink).await;

    let status = if tally.pages_fetched == 0 && spec.max_requests() > 0 {
        tracing::error!("Crawl run {} could not fetch a single search page", run_id);
        RunStatus::Failed
    } else {
        if tally.postings == 0 {
            tracing::warn!(
                "Crawl run {} extracted zero postings; the site layout may have changed",
                run_id
            );
        }
        RunStatus::Completed
    };

    let mut repository = lock_repository(&repository)?;
    repository.complete_run(run_id, status, tally.postings)?;

    Ok(repository.get_run(run_id)?)
}
