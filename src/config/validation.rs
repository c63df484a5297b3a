use crate::config::types::{
    Config, CrawlerConfig, KeywordEntry, OutputConfig, SearchConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Requests closer together than this get listing sites to start blocking
const MIN_REQUEST_DELAY_MS: u64 = 250;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_search_config(&config.search)?;
    validate_output_config(&config.output)?;
    validate_keyword_entries(&config.keywords)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and 100, got {}",
            config.max_pages
        )));
    }

    if config.request_delay_ms < MIN_REQUEST_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "request_delay_ms must be >= {}ms, got {}ms",
            MIN_REQUEST_DELAY_MS, config.request_delay_ms
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the target site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    let origin = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site origin: {}", e)))?;

    if origin.scheme() != "http" && origin.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Site origin '{}' must use HTTP or HTTPS",
            config.origin
        )));
    }

    if origin.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site origin '{}' has no host",
            config.origin
        )));
    }

    if !config.search_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "search_path must start with '/', got '{}'",
            config.search_path
        )));
    }

    for (name, value) in [
        ("keyword_param", &config.keyword_param),
        ("location_param", &config.location_param),
        ("offset_param", &config.offset_param),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates search terms
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_term_list("keywords", &config.keywords)?;
    validate_term_list("locations", &config.locations)?;
    Ok(())
}

/// A term list must be non-empty and contain no blank entries
fn validate_term_list(name: &str, terms: &[String]) -> Result<(), ConfigError> {
    if terms.is_empty() {
        return Err(ConfigError::Validation(format!(
            "search {} must contain at least one entry",
            name
        )));
    }

    if terms.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "search {} cannot contain blank entries",
            name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if config.staleness_days < 1 {
        return Err(ConfigError::Validation(
            "staleness_days must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates extra keyword dictionary entries
fn validate_keyword_entries(entries: &[KeywordEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.canonical.trim().is_empty() {
            return Err(ConfigError::Validation(
                "keyword canonical name cannot be empty".to_string(),
            ));
        }

        if entry.variants.is_empty() || entry.variants.iter().any(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "keyword '{}' needs at least one non-blank variant",
                entry.canonical
            )));
        }
    }

    Ok(())
}
