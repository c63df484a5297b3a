//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Job-Ripple database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    posting_count INTEGER NOT NULL DEFAULT 0
);

-- One row per logical posting, keyed by normalized URL
CREATE TABLE IF NOT EXISTS postings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT NOT NULL,
    seniority TEXT NOT NULL,
    source TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    last_verified_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_postings_active ON postings(is_active);
CREATE INDEX IF NOT EXISTS idx_postings_verified ON postings(last_verified_at);

-- Canonical keyword tags, replaced wholesale on every sighting
CREATE TABLE IF NOT EXISTS posting_keywords (
    posting_id INTEGER NOT NULL REFERENCES postings(id) ON DELETE CASCADE,
    keyword TEXT NOT NULL,
    PRIMARY KEY (posting_id, keyword)
);

CREATE INDEX IF NOT EXISTS idx_posting_keywords_keyword ON posting_keywords(keyword);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The SQLite connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["runs", "postings", "posting_keywords"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_url_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let insert = "INSERT INTO postings (url, title, company, location, seniority, source, last_verified_at, created_at)
                      VALUES ('https://example.com/jobs/1', 't', 'c', 'l', 'mid', 's', 'now', 'now')";
        conn.execute(insert, []).unwrap();

        assert!(conn.execute(insert, []).is_err());
    }
}
