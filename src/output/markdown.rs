//! Markdown digest generation
//!
//! This module renders the active postings of the repository as a markdown
//! digest grouped by seniority level.

use crate::posting::{Seniority, StoredPosting};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown digest of the active postings to a file
///
/// # Arguments
///
/// * `postings` - Postings to include; inactive ones are skipped
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the digest
/// * `Err(io::Error)` - Failed to write the file
pub fn generate_markdown_digest(
    postings: &[StoredPosting],
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_digest(postings);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats active postings as markdown, one table per seniority level
///
/// Levels are listed most senior first; empty levels are omitted.
pub fn format_markdown_digest(postings: &[StoredPosting]) -> String {
    let active: Vec<&StoredPosting> = postings.iter().filter(|p| p.is_active).collect();

    let mut md = String::new();
    md.push_str("# Job-Ripple Posting Digest\n\n");
    md.push_str(&format!("- **Active Postings**: {}\n\n", active.len()));

    if active.is_empty() {
        md.push_str("_No active postings._\n");
        return md;
    }

    for level in Seniority::all_levels().iter().rev() {
        let group: Vec<&&StoredPosting> = active.iter().filter(|p| p.seniority == *level).collect();
        if group.is_empty() {
            continue;
        }

        md.push_str(&format!("## {} ({})\n\n", heading(*level), group.len()));
        md.push_str("| Title | Company | Location | Keywords | Last Seen |\n");
        md.push_str("|-------|---------|----------|----------|-----------|\n");

        for posting in group {
            let keywords = posting
                .keywords
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");

            md.push_str(&format!(
                "| [{}]({}) | {} | {} | {} | {} |\n",
                escape_cell(&posting.title),
                posting.url,
                escape_cell(&posting.company),
                escape_cell(&posting.location),
                if keywords.is_empty() { "-".to_string() } else { keywords },
                posting.last_verified_at.format("%Y-%m-%d"),
            ));
        }
        md.push('\n');
    }

    md
}

fn heading(level: Seniority) -> &'static str {
    match level {
        Seniority::Entry => "Entry Level",
        Seniority::Mid => "Mid Level",
        Seniority::Senior => "Senior",
        Seniority::Staff => "Staff / Principal",
        Seniority::Management => "Management",
    }
}

/// Keeps scraped text from breaking the table layout
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
