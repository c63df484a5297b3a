//! Repository statistics display
//!
//! This module renders the aggregate counts of the posting repository and
//! the crawl-run ledger for the console.

use crate::storage::{RepositoryStats, RunRecord};

/// Formats repository statistics for console display
pub fn format_statistics(stats: &RepositoryStats, latest_run: Option<&RunRecord>) -> String {
    let mut out = String::new();

    out.push_str("=== Posting Repository Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Total postings: {}\n", stats.total));
    out.push_str(&format!(
        "  Active: {} ({:.1}%)\n",
        stats.active,
        percentage(stats.active, stats.total)
    ));
    out.push_str(&format!("  Inactive: {}\n", stats.inactive()));
    out.push_str(&format!("  Distinct companies: {}\n", stats.distinct_companies));
    out.push_str(&format!("  Sources: {}\n\n", stats.distinct_sources));

    if !stats.by_seniority.is_empty() {
        out.push_str("Active Postings by Seniority:\n");
        // Most senior first
        for (level, count) in stats.by_seniority.iter().rev() {
            out.push_str(&format!(
                "  {}: {} ({:.1}%)\n",
                level,
                count,
                percentage(*count, stats.active)
            ));
        }
        out.push('\n');
    }

    if !stats.top_keywords.is_empty() {
        out.push_str("Top Keywords:\n");
        for (keyword, count) in &stats.top_keywords {
            out.push_str(&format!("  {}: {}\n", keyword, count));
        }
        out.push('\n');
    }

    match latest_run {
        Some(run) => {
            out.push_str(&format!("Latest Run (#{}):\n", run.id));
            out.push_str(&format!("  Status: {}\n", run.status.to_db_string()));
            out.push_str(&format!("  Started: {}\n", run.started_at.to_rfc3339()));
            if let Some(finished) = run.finished_at {
                out.push_str(&format!(
                    "  Duration: {} seconds\n",
                    (finished - run.started_at).num_seconds()
                ));
            }
            out.push_str(&format!("  Postings seen: {}\n", run.posting_count));
        }
        None => out.push_str("No crawl runs recorded yet\n"),
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `latest_run` - The most recent crawl run, if any
pub fn print_statistics(stats: &RepositoryStats, latest_run: Option<&RunRecord>) {
    print!("{}", format_statistics(stats, latest_run));
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}
