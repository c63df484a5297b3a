//! Storage traits and error types
//!
//! This module defines the trait interface for posting repositories and
//! associated error types.

use crate::posting::{ClassifiedPosting, StoredPosting};
use crate::storage::{RepositoryStats, RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Posting not found: {0}")]
    PostingNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid posting URL: {0}")]
    InvalidUrl(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for posting repository implementations
///
/// Postings are identified by their normalized URL. Rows are never deleted;
/// postings that stop appearing are retired by the staleness sweep.
pub trait Repository {
    // ===== Postings =====

    /// Inserts or refreshes a posting as of `now`
    ///
    /// A new URL inserts a row. A known URL refreshes `last_verified_at`,
    /// reactivates the row, replaces its keyword set and refreshes its
    /// seniority. Title, company, location and source keep their first-seen
    /// values.
    ///
    /// # Returns
    ///
    /// The posting ID (unchanged across repeated sightings)
    fn upsert_at(
        &mut self,
        source: &str,
        posting: &ClassifiedPosting,
        now: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Inserts or refreshes a posting as of the current time
    fn upsert(&mut self, source: &str, posting: &ClassifiedPosting) -> StorageResult<i64> {
        self.upsert_at(source, posting, Utc::now())
    }

    /// Deactivates active postings not verified within the staleness window
    ///
    /// # Returns
    ///
    /// The number of postings deactivated by this sweep
    fn mark_stale_at(&mut self, now: DateTime<Utc>) -> StorageResult<usize>;

    /// Runs the staleness sweep as of the current time
    fn mark_stale(&mut self) -> StorageResult<usize> {
        self.mark_stale_at(Utc::now())
    }

    /// Searches active postings
    ///
    /// # Arguments
    ///
    /// * `keywords` - Postings must carry at least one; empty means no filter
    /// * `location_pattern` - Case-insensitive SQL `LIKE` pattern; a pattern
    ///   without wildcards matches as a substring
    /// * `limit` - Maximum number of results
    ///
    /// Results are ordered by `last_verified_at`, newest first.
    fn search(
        &self,
        keywords: &[String],
        location_pattern: &str,
        limit: usize,
    ) -> StorageResult<Vec<StoredPosting>>;

    /// Gets every active posting, newest first
    fn active_postings(&self) -> StorageResult<Vec<StoredPosting>>;

    /// Gets a posting by ID
    fn get_posting(&self, id: i64) -> StorageResult<StoredPosting>;

    /// Gets a posting by URL (normalized before lookup)
    fn get_posting_by_url(&self, url: &str) -> StorageResult<Option<StoredPosting>>;

    /// Gets aggregate counts
    fn stats(&self) -> StorageResult<RepositoryStats>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as finished with a final status and posting count
    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        posting_count: usize,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
