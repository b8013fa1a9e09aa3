//! Line-delimited URL files
//!
//! One URL per line; surrounding whitespace is ignored and blank lines are
//! skipped. This is both a seed input and the fixed list the recrawl
//! scheduler re-harvests.

use crate::HarvestError;
use std::path::Path;

/// Parses a line-delimited URL list
///
/// # Examples
///
/// ```
/// use topic_harvester::seeds::parse_url_list;
///
/// let urls = parse_url_list("  https://example.edu/msc \n\n https://example.edu/ma\n");
/// assert_eq!(urls, vec!["https://example.edu/msc", "https://example.edu/ma"]);
/// ```
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads a URL list file
///
/// A missing or unreadable file is a seed discovery failure.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, HarvestError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| HarvestError::seed_discovery(path.display().to_string(), e))?;
    Ok(parse_url_list(&content))
}

/// Writes URLs to a file, one per line
pub fn write_url_list(path: &Path, urls: &[String]) -> Result<(), HarvestError> {
    let mut content = urls.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}
