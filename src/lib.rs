//! Job-Ripple: a polite job-posting harvester
//!
//! This crate crawls the search pages of a public job listings site, extracts
//! postings from whatever layout the site currently serves, tags them with
//! technology keywords and a seniority level, and keeps a deduplicated,
//! staleness-aware SQLite repository of what it has seen.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod output;
pub mod posting;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Job-Ripple operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid classifier pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty link")]
    EmptyLink,
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{Classifier, KeywordDictionary};
pub use config::Config;
pub use posting::{ClassifiedPosting, RawPosting, SearchSpec, Seniority, StoredPosting};
pub use crate::url::{normalize_posting_url, resolve_posting_url};
