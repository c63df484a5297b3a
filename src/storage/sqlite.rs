//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Repository trait.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that string comparison in SQL orders them
//! chronologically.

use crate::posting::{ClassifiedPosting, Seniority, StoredPosting, NOT_SPECIFIED};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Repository, StorageError, StorageResult};
use crate::storage::{RepositoryStats, RunRecord, RunStatus, DEFAULT_STALENESS_DAYS};
use crate::url::normalize_posting_url;
use crate::RippleError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const POSTING_COLUMNS: &str =
    "id, title, company, location, url, seniority, source, is_active, last_verified_at, created_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, posting_count";

/// Number of keywords reported in repository statistics
const TOP_KEYWORD_LIMIT: usize = 10;

/// SQLite posting repository
pub struct SqliteRepository {
    conn: Connection,
    staleness_days: u32,
}

impl SqliteRepository {
    /// Creates a new SqliteRepository instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRepository)` - Successfully opened/created database
    /// * `Err(RippleError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, RippleError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            staleness_days: DEFAULT_STALENESS_DAYS,
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, RippleError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            staleness_days: DEFAULT_STALENESS_DAYS,
        })
    }

    /// Sets the staleness window in days
    pub fn with_staleness_days(mut self, days: u32) -> Self {
        self.staleness_days = days;
        self
    }

    pub fn staleness_days(&self) -> u32 {
        self.staleness_days
    }

    fn load_keywords(&self, posting_id: i64) -> StorageResult<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT keyword FROM posting_keywords WHERE posting_id = ?1")?;

        let keywords = stmt
            .query_map(params![posting_id], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(keywords)
    }

    /// Runs a posting query and attaches each row's keywords
    fn query_postings(&self, sql: &str, values: &[Value]) -> StorageResult<Vec<StoredPosting>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut postings = stmt
            .query_map(params_from_iter(values.iter()), row_to_posting)?
            .collect::<Result<Vec<_>, _>>()?;

        for posting in &mut postings {
            posting.keywords = self.load_keywords(posting.id)?;
        }

        Ok(postings)
    }

    fn count(&self, sql: &str) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl Repository for SqliteRepository {
    // ===== Postings =====

    fn upsert_at(
        &mut self,
        source: &str,
        posting: &ClassifiedPosting,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let url = normalize_posting_url(&posting.url)
            .map_err(|e| StorageError::InvalidUrl(format!("{} ({})", posting.url, e)))?
            .to_string();
        let now = format_timestamp(now);

        let tx = self.conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row("SELECT id FROM postings WHERE url = ?1", params![url], |row| {
                row.get(0)
            })
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE postings SET last_verified_at = ?1, is_active = 1, seniority = ?2 WHERE id = ?3",
                    params![now, posting.seniority.to_db_string(), id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO postings (url, title, company, location, seniority, source, is_active, last_verified_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
                    params![
                        url,
                        posting.title,
                        posting.company,
                        posting.location,
                        posting.seniority.to_db_string(),
                        source,
                        now
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.execute(
            "DELETE FROM posting_keywords WHERE posting_id = ?1",
            params![id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO posting_keywords (posting_id, keyword) VALUES (?1, ?2)",
            )?;
            for keyword in &posting.keywords {
                stmt.execute(params![id, keyword])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    fn mark_stale_at(&mut self, now: DateTime<Utc>) -> StorageResult<usize> {
        let cutoff = now - Duration::days(i64::from(self.staleness_days));

        let count = self.conn.execute(
            "UPDATE postings SET is_active = 0 WHERE is_active = 1 AND last_verified_at < ?1",
            params![format_timestamp(cutoff)],
        )?;

        Ok(count)
    }

    fn search(
        &self,
        keywords: &[String],
        location_pattern: &str,
        limit: usize,
    ) -> StorageResult<Vec<StoredPosting>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let mut sql = format!(
            "SELECT {} FROM postings WHERE is_active = 1 AND location LIKE ?1",
            POSTING_COLUMNS
        );
        let mut values = vec![Value::Text(like_pattern(location_pattern))];

        if !keywords.is_empty() {
            let placeholders = (0..keywords.len())
                .map(|i| format!("?{}", i + 2))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM posting_keywords k WHERE k.posting_id = postings.id AND k.keyword IN ({}))",
                placeholders
            ));
            values.extend(keywords.into_iter().map(Value::Text));
        }

        sql.push_str(&format!(
            " ORDER BY last_verified_at DESC, id DESC LIMIT ?{}",
            values.len() + 1
        ));
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        self.query_postings(&sql, &values)
    }

    fn active_postings(&self) -> StorageResult<Vec<StoredPosting>> {
        let sql = format!(
            "SELECT {} FROM postings WHERE is_active = 1 ORDER BY last_verified_at DESC, id DESC",
            POSTING_COLUMNS
        );
        self.query_postings(&sql, &[])
    }

    fn get_posting(&self, id: i64) -> StorageResult<StoredPosting> {
        let sql = format!("SELECT {} FROM postings WHERE id = ?1", POSTING_COLUMNS);
        self.query_postings(&sql, &[Value::Integer(id)])?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::PostingNotFound(format!("Posting ID {}", id)))
    }

    fn get_posting_by_url(&self, url: &str) -> StorageResult<Option<StoredPosting>> {
        let normalized = normalize_posting_url(url)
            .map_err(|e| StorageError::InvalidUrl(format!("{} ({})", url, e)))?;

        let sql = format!("SELECT {} FROM postings WHERE url = ?1", POSTING_COLUMNS);
        Ok(self
            .query_postings(&sql, &[Value::Text(normalized.to_string())])?
            .into_iter()
            .next())
    }

    fn stats(&self) -> StorageResult<RepositoryStats> {
        let total = self.count("SELECT COUNT(*) FROM postings")?;
        let active = self.count("SELECT COUNT(*) FROM postings WHERE is_active = 1")?;
        let distinct_sources = self.count("SELECT COUNT(DISTINCT source) FROM postings")?;

        let distinct_companies: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT company) FROM postings WHERE company != ?1",
            params![NOT_SPECIFIED],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT seniority, COUNT(*) FROM postings WHERE is_active = 1 GROUP BY seniority",
        )?;
        let by_seniority: BTreeMap<Seniority, usize> = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter_map(|(level, count)| {
                Seniority::from_db_string(&level).map(|level| (level, count as usize))
            })
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT k.keyword, COUNT(*) AS n
             FROM posting_keywords k JOIN postings p ON p.id = k.posting_id
             WHERE p.is_active = 1
             GROUP BY k.keyword
             ORDER BY n DESC, k.keyword ASC
             LIMIT ?1",
        )?;
        let top_keywords = stmt
            .query_map(params![TOP_KEYWORD_LIMIT as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RepositoryStats {
            total,
            active,
            distinct_companies: distinct_companies as usize,
            distinct_sources,
            by_seniority,
            top_keywords,
        })
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status, posting_count) VALUES (?1, ?2, ?3, 0)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        posting_count: usize,
    ) -> StorageResult<()> {
        let now = format_timestamp(Utc::now());
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, posting_count = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, posting_count as i64, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;

        Ok(run)
    }
}

fn row_to_posting(row: &Row<'_>) -> rusqlite::Result<StoredPosting> {
    Ok(StoredPosting {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        location: row.get(3)?,
        url: row.get(4)?,
        keywords: BTreeSet::new(),
        seniority: Seniority::from_db_string(&row.get::<_, String>(5)?).unwrap_or_default(),
        source: row.get(6)?,
        is_active: row.get::<_, i64>(7)? != 0,
        last_verified_at: parse_timestamp(row, 8)?,
        created_at: parse_timestamp(row, 9)?,
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let finished_at = match row.get::<_, Option<String>>(2)? {
        Some(raw) => Some(decode_timestamp(2, &raw)?),
        None => None,
    };

    Ok(RunRecord {
        id: row.get(0)?,
        started_at: parse_timestamp(row, 1)?,
        finished_at,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        posting_count: row.get::<_, i64>(5)? as usize,
    })
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    decode_timestamp(idx, &raw)
}

fn decode_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Turns a user location pattern into a `LIKE` pattern
///
/// Patterns without wildcards match as substrings; an empty pattern matches
/// everything.
fn like_pattern(pattern: &str) -> String {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        "%".to_string()
    } else if pattern.contains('%') || pattern.contains('_') {
        pattern.to_string()
    } else {
        format!("%{}%", pattern)
    }
}
