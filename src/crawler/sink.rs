//! Posting sinks
//!
//! The crawl loop hands every classified posting to a sink. The crawler does
//! not care what the sink does with it; the production sink upserts into the
//! repository, and tests substitute recording doubles.

use crate::posting::ClassifiedPosting;
use crate::storage::{Repository, SqliteRepository};
use crate::RippleError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives classified postings from the crawl loop
///
/// Calls are strictly sequential within one crawl.
#[async_trait]
pub trait PostingSink: Send + Sync {
    /// Persists one posting seen on `source`, returning its repository ID
    async fn persist(&self, source: &str, posting: &ClassifiedPosting) -> Result<i64, RippleError>;
}

/// Sink that upserts postings into a shared SQLite repository
pub struct RepositorySink {
    repository: Arc<Mutex<SqliteRepository>>,
}

impl RepositorySink {
    pub fn new(repository: Arc<Mutex<SqliteRepository>>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PostingSink for RepositorySink {
    async fn persist(&self, source: &str, posting: &ClassifiedPosting) -> Result<i64, RippleError> {
        let mut repository = lock_repository(&self.repository)?;
        Ok(repository.upsert(source, posting)?)
    }
}

/// Locks the shared repository, reporting a poisoned lock as a storage error
pub(crate) fn lock_repository(
    repository: &Mutex<SqliteRepository>,
) -> Result<MutexGuard<'_, SqliteRepository>, RippleError> {
    repository
        .lock()
        .map_err(|_| RippleError::Storage("Repository lock poisoned".to_string()))
}
