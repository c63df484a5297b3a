//! Output module for reporting on the posting repository
//!
//! This module handles:
//! - Printing repository statistics to the console
//! - Exporting a markdown digest of active postings

mod markdown;
mod stats;

pub use markdown::{format_markdown_digest, generate_markdown_digest};
pub use stats::{format_statistics, print_statistics};

use crate::storage::Repository;
use crate::RippleError;
use std::path::Path;

/// Exports the active postings of a repository as a markdown digest
///
/// # Returns
///
/// The number of postings written
pub fn export_digest(repository: &dyn Repository, output_path: &Path) -> Result<usize, RippleError> {
    let postings = repository.active_postings()?;
    generate_markdown_digest(&postings, output_path)?;
    Ok(postings.len())
}
