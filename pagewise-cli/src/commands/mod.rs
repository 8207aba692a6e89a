//! CLI command implementations

mod extract;
mod info;
mod list;
mod pages;

pub use extract::{extract, ExtractArgs, FormatStyle};
pub use info::info;
pub use list::{list, ListFormat};
pub use pages::{pages, PagesArgs};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pagewise_core::{EpubExtractor, ExtractorOptions};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open an EPUB and process its navigation behind a spinner
fn open_book(input: &str, options: ExtractorOptions) -> Result<EpubExtractor> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let name = Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());
    pb.set_message(format!("Loading {}...", name));

    let loaded = EpubExtractor::open_with_options(input, options)
        .with_context(|| format!("Failed to open {}", input))
        .and_then(|extractor| {
            extractor
                .navigation()
                .with_context(|| format!("Failed to read navigation of {}", input))?;
            Ok(extractor)
        });

    pb.finish_and_clear();
    loaded
}

/// Parse a 1-based chapter range like "1-5,7" into sorted unique 0-based
/// indices
pub fn parse_chapter_range(range: &str) -> Result<Vec<usize>> {
    let mut indices = BTreeSet::new();

    for part in range.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse_chapter_number(start)?, parse_chapter_number(end)?),
            None => {
                let n = parse_chapter_number(part)?;
                (n, n)
            }
        };
        if start > end {
            bail!("Invalid chapter range '{}': start is after end", part);
        }
        indices.extend(start - 1..end);
    }

    if indices.is_empty() {
        bail!("Empty chapter range");
    }
    Ok(indices.into_iter().collect())
}

fn parse_chapter_number(s: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a valid chapter number", s.trim()))?;
    if n < 1 {
        bail!("Chapter numbers start at 1");
    }
    Ok(n)
}

/// Split a comma separated list of page labels
pub fn parse_page_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write text to a file, or to stdout when no path is given
fn write_output(text: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write output file: {}", path))?;
            info!("Wrote {} characters to {}", text.chars().count(), path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chapter_range() {
        assert_eq!(parse_chapter_range("1-3,7").unwrap(), vec![0, 1, 2, 6]);
        assert_eq!(parse_chapter_range("5, 2-3, 3").unwrap(), vec![1, 2, 4]);
        assert_eq!(parse_chapter_range("4").unwrap(), vec![3]);
    }

    #[test]
    fn test_parse_chapter_range_errors() {
        assert!(parse_chapter_range("0").is_err());
        assert!(parse_chapter_range("3-1").is_err());
        assert!(parse_chapter_range("a-b").is_err());
        assert!(parse_chapter_range(" , ").is_err());
    }

    #[test]
    fn test_parse_page_labels() {
        assert_eq!(parse_page_labels("1, ii ,3,,"), vec!["1", "ii", "3"]);
    }
}
