//! Storage module for persisting postings
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Idempotent posting upserts keyed by normalized URL
//! - The staleness sweep that retires postings no longer seen
//! - Keyword and location search
//! - The crawl-run ledger

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRepository;
pub use traits::{Repository, StorageError, StorageResult};

use crate::config::OutputConfig;
use crate::posting::Seniority;
use crate::RippleError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Days after which an unseen posting is considered stale
pub const DEFAULT_STALENESS_DAYS: u32 = 7;

/// Opens the repository described by the output configuration
///
/// # Arguments
///
/// * `config` - Output configuration (database path and staleness window)
///
/// # Returns
///
/// * `Ok(SqliteRepository)` - Successfully opened repository
/// * `Err(RippleError)` - Failed to open the database
pub fn open_repository(config: &OutputConfig) -> Result<SqliteRepository, RippleError> {
    Ok(SqliteRepository::new(Path::new(&config.database_path))?
        .with_staleness_days(config.staleness_days))
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: String,
    pub status: RunStatus,
    pub posting_count: usize,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Aggregate counts over the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStats {
    pub total: usize,
    pub active: usize,
    pub distinct_companies: usize,
    pub distinct_sources: usize,
    /// Active postings per seniority level
    pub by_seniority: BTreeMap<Seniority, usize>,
    /// Most frequent keywords among active postings, most frequent first
    pub top_keywords: Vec<(String, usize)>,
}

impl RepositoryStats {
    pub fn inactive(&self) -> usize {
        self.total.saturating_sub(self.active)
    }
}
