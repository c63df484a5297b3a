//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from a config file on disk to rows in
//! the SQLite repository.

use chrono::{Duration, Utc};
use job_ripple::config::{load_config_with_hash, Config};
use job_ripple::crawler::run_crawl;
use job_ripple::output::export_digest;
use job_ripple::storage::{open_repository, Repository, RunStatus};
use job_ripple::Seniority;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// First results page in the current card layout
const MOSAIC_PAGE: &str = r#"
<html><body>
  <div id="mosaic-provider-jobcards">
    <div class="job_seen_beacon">
      <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob/rust-1?from=serp&amp;vjk=aa">
        <span>Senior Rust Developer</span></a></h2>
      <span data-testid="company-name">Ferrous Systems</span>
      <div data-testid="text-location">Remote</div>
    </div>
    <div class="job_seen_beacon">
      <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob/rust-2?from=serp">
        <span>Rust Developer (AWS, Kubernetes)</span></a></h2>
      <span data-testid="company-name">Cloudy Inc</span>
      <div data-testid="text-location">Seattle, WA</div>
    </div>
  </div>
</body></html>
"#;

/// Second results page served in an unrecognized layout
const UNKNOWN_LAYOUT_PAGE: &str = r#"
<html><body>
  <main>
    <section class="result">
      <h3>Junior Backend Developer</h3>
      <p>Hybrid</p>
      <a href="/viewjob/rust-3?utm=x">See details</a>
    </section>
  </main>
</body></html>
"#;

/// Writes a config file pointing at the mock server and loads it
fn write_config(dir: &TempDir, origin: &str) -> (Config, String) {
    let config_path = dir.path().join("config.toml");
    let toml = format!(
        r#"
[crawler]
max-pages = 2
request-delay-ms = 250
timeout-secs = 5
max-redirects = 3

[site]
name = "mock-board"
origin = "{origin}"
search-path = "/jobs"

[search]
keywords = ["rust developer"]
locations = ["Remote"]

[output]
database-path = "{db}"
summary-path = "{summary}"
"#,
        origin = origin,
        db = dir.path().join("postings.db").display(),
        summary = dir.path().join("postings.md").display(),
    );
    std::fs::write(&config_path, toml).expect("Failed to write config");

    load_config_with_hash(&config_path).expect("Failed to load config")
}

async fn mount_results(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("q", "rust developer"))
        .and(query_param("l", "Remote"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOSAIC_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("start", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UNKNOWN_LAYOUT_PAGE))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_into_repository() {
    let server = MockServer::start().await;
    mount_results(&server).await;

    let dir = TempDir::new().unwrap();
    let (config, hash) = write_config(&dir, &server.uri());

    let run = run_crawl(&config, &hash).await.expect("Crawl failed");

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.posting_count, 3);
    assert_eq!(run.config_hash, hash);

    let repository = open_repository(&config.output).unwrap();
    let stats = repository.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 3);
    assert_eq!(stats.distinct_sources, 1);

    let senior = repository
        .get_posting_by_url(&format!("{}/viewjob/rust-1", server.uri()))
        .unwrap()
        .expect("Posting should be stored under its normalized URL");
    assert_eq!(senior.title, "Senior Rust Developer");
    assert_eq!(senior.company, "Ferrous Systems");
    assert_eq!(senior.seniority, Seniority::Senior);
    assert_eq!(senior.source, "mock-board");

    let cloud = repository.search(&["kubernetes".to_string()], "%", 10).unwrap();
    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].location, "Seattle, WA");
    assert!(cloud[0].keywords.contains("aws"));

    let fallback = repository.search(&[], "hybrid", 10).unwrap();
    assert_eq!(fallback.len(), 1);
    assert_eq!(fallback[0].title, "Junior Backend Developer");
    assert_eq!(fallback[0].seniority, Seniority::Entry);
}

#[tokio::test]
async fn test_recrawl_keeps_one_row_per_posting() {
    let server = MockServer::start().await;
    mount_results(&server).await;

    let dir = TempDir::new().unwrap();
    let (config, hash) = write_config(&dir, &server.uri());

    let first = run_crawl(&config, &hash).await.unwrap();
    let ids_before: Vec<i64> = {
        let repository = open_repository(&config.output).unwrap();
        let mut ids: Vec<i64> = repository
            .active_postings()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        ids
    };

    let second = run_crawl(&config, &hash).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.posting_count, 3);

    let repository = open_repository(&config.output).unwrap();
    let mut ids_after: Vec<i64> = repository
        .active_postings()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    ids_after.sort();

    assert_eq!(ids_before, ids_after);
    assert_eq!(repository.stats().unwrap().total, 3);
    assert_eq!(repository.get_latest_run().unwrap().unwrap().id, second.id);
}

#[tokio::test]
async fn test_blocked_crawl_records_failed_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, hash) = write_config(&dir, &server.uri());

    // The first page fails, so the second is never requested
    let run = run_crawl(&config, &hash).await.unwrap();

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.posting_count, 0);
    assert_eq!(
        open_repository(&config.output).unwrap().stats().unwrap().total,
        0
    );
}

#[tokio::test]
async fn test_sweep_and_digest_after_crawl() {
    let server = MockServer::start().await;
    mount_results(&server).await;

    let dir = TempDir::new().unwrap();
    let (config, hash) = write_config(&dir, &server.uri());
    run_crawl(&config, &hash).await.unwrap();

    let mut repository = open_repository(&config.output).unwrap();
    let digest_path = Path::new(&config.output.summary_path);

    assert_eq!(export_digest(&repository, digest_path).unwrap(), 3);
    let digest = std::fs::read_to_string(digest_path).unwrap();
    assert!(digest.contains("## Senior (1)"));
    assert!(digest.contains("Ferrous Systems"));

    // Nothing is stale yet
    assert_eq!(repository.mark_stale().unwrap(), 0);

    let later = Utc::now() + Duration::days(8);
    assert_eq!(repository.mark_stale_at(later).unwrap(), 3);
    assert_eq!(repository.stats().unwrap().active, 0);
    assert_eq!(repository.stats().unwrap().total, 3);

    assert_eq!(export_digest(&repository, digest_path).unwrap(), 0);
}
