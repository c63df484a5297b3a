//! Job-Ripple main entry point
//!
//! This is the command-line interface for the Job-Ripple posting harvester.
//! Each invocation performs one action and exits; an external scheduler
//! (cron, a systemd timer) decides when crawls and sweeps run.

use clap::Parser;
use job_ripple::config::{load_config_with_hash, Config};
use job_ripple::crawler::run_crawl;
use job_ripple::storage::{open_repository, Repository, RunStatus};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Job-Ripple: a polite job-posting harvester
///
/// Job-Ripple searches a public job listings site for the configured
/// keywords and locations, tags each posting with technology keywords and
/// a seniority level, and keeps a deduplicated SQLite repository of what
/// it has seen.
#[derive(Parser, Debug)]
#[command(name = "job-ripple")]
#[command(version)]
#[command(about = "A polite job-posting harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "mark_stale", "search", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "mark_stale", "search", "export_summary"])]
    stats: bool,

    /// Deactivate postings not seen within the staleness window and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "search", "export_summary"])]
    mark_stale: bool,

    /// Search active postings by comma-separated keywords and exit
    #[arg(long, value_name = "KEYWORDS", value_delimiter = ',', num_args = 0..)]
    search: Option<Vec<String>>,

    /// Location pattern for --search (SQL LIKE; plain text matches as substring)
    #[arg(long, value_name = "PATTERN", default_value = "%", requires = "search")]
    location: String,

    /// Maximum number of --search results
    #[arg(long, value_name = "N", default_value_t = 20, requires = "search")]
    limit: usize,

    /// Write a markdown digest of active postings and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "mark_stale", "search"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.mark_stale {
        handle_mark_stale(&config)?;
    } else if let Some(keywords) = &cli.search {
        handle_search(&config, keywords, &cli.location, cli.limit)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("job_ripple=info,warn"),
            1 => EnvFilter::new("job_ripple=debug,info"),
            2 => EnvFilter::new("job_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    let spec = config.search_spec();

    println!("=== Job-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Pages per search: {}", config.crawler.max_pages);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    if let Some(user_agent) = &config.crawler.user_agent {
        println!("  User agent: {}", user_agent);
    }

    println!("\nSite:");
    println!("  Name: {}", config.site.name);
    println!("  Origin: {}", config.site.origin);
    println!("  Search path: {}", config.site.search_path);

    println!("\nKeywords ({}):", spec.keywords.len());
    for keyword in &spec.keywords {
        println!("  - {}", keyword);
    }

    println!("\nLocations ({}):", spec.locations.len());
    for location in &spec.locations {
        println!("  - {}", location);
    }

    if !config.keywords.is_empty() {
        println!("\nExtra Dictionary Entries ({}):", config.keywords.len());
        for entry in &config.keywords {
            println!("  - {} ({})", entry.canonical, entry.variants.join(", "));
        }
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  Staleness window: {} days", config.output.staleness_days);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would run {} searches, at most {} requests",
        spec.pair_count(),
        spec.max_requests()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use job_ripple::output::print_statistics;

    println!("Database: {}\n", config.output.database_path);

    let repository = open_repository(&config.output)?;
    let stats = repository.stats()?;
    let latest_run = repository.get_latest_run()?;

    print_statistics(&stats, latest_run.as_ref());

    Ok(())
}

/// Handles the --mark-stale mode: runs the staleness sweep
fn handle_mark_stale(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut repository = open_repository(&config.output)?;
    let deactivated = repository.mark_stale()?;

    tracing::info!(
        "Staleness sweep deactivated {} postings (window: {} days)",
        deactivated,
        config.output.staleness_days
    );
    println!("✓ Deactivated {} stale postings", deactivated);

    Ok(())
}

/// Handles the --search mode: prints matching active postings
fn handle_search(
    config: &Config,
    keywords: &[String],
    location: &str,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let repository = open_repository(&config.output)?;
    let results = repository.search(keywords, location, limit)?;

    if results.is_empty() {
        println!("No matching postings");
        return Ok(());
    }

    for posting in &results {
        let keywords: Vec<&str> = posting.keywords.iter().map(String::as_str).collect();
        println!("{} [{}]", posting.title, posting.seniority);
        println!("  {} | {}", posting.company, posting.location);
        println!("  {}", posting.url);
        if !keywords.is_empty() {
            println!("  keywords: {}", keywords.join(", "));
        }
        println!(
            "  last seen: {}",
            posting.last_verified_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!();
    }
    println!("{} postings", results.len());

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown digest
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use job_ripple::output::export_digest;

    println!("=== Exporting Posting Digest ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let repository = open_repository(&config.output)?;

    tracing::info!("Generating markdown digest...");
    let written = export_digest(&repository, Path::new(&config.output.summary_path))?;

    println!(
        "✓ Digest of {} postings exported to: {}",
        written, config.output.summary_path
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let spec = config.search_spec();
    tracing::info!(
        "Site: {}, keywords: {}, locations: {}, pages per search: {}",
        config.site.name,
        spec.keywords.len(),
        spec.locations.len(),
        spec.max_pages
    );

    match run_crawl(config, config_hash).await {
        Ok(run) if run.status == RunStatus::Failed => {
            tracing::error!("Crawl run {} failed: no search page could be fetched", run.id);
            Err(format!("crawl run {} failed", run.id).into())
        }
        Ok(run) => {
            tracing::info!(
                "Crawl run {} completed with {} postings",
                run.id,
                run.posting_count
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
