//! Extract command implementation

use super::{open_book, parse_chapter_range, write_output};
use anyhow::{bail, Result};
use clap::ValueEnum;
use pagewise_core::text::{format_clauses, format_paragraphs, format_sentences, split_long_lines};
use pagewise_core::{ChapterExtraction, ExtractorOptions, TextCleaner};
use tracing::{info, warn};

/// Paragraph layout of extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatStyle {
    /// One paragraph per line, no blank lines
    Compact,

    /// Paragraphs separated by a blank line
    Readable,

    /// One sentence per line, blank line between paragraphs
    Sentences,

    /// One clause per line, split after commas, semicolons and colons
    Clauses,
}

impl FormatStyle {
    fn paragraph_separator(self) -> &'static str {
        match self {
            FormatStyle::Compact => "\n",
            FormatStyle::Readable | FormatStyle::Sentences | FormatStyle::Clauses => "\n\n",
        }
    }

    fn splits_text(self) -> bool {
        matches!(self, FormatStyle::Sentences | FormatStyle::Clauses)
    }
}

/// Flags of the extract command
#[derive(Debug, Clone)]
pub struct ExtractArgs {
    pub output: Option<String>,
    pub chapters: Option<String>,
    pub format_style: FormatStyle,
    pub max_length: Option<usize>,
    pub clean: bool,
    pub keep_footnotes: bool,
    pub keep_page_numbers: bool,
    pub skip_toc: bool,
    pub titles: bool,
    pub dedupe: bool,
}

impl ExtractArgs {
    fn cleaner(&self) -> TextCleaner {
        if self.clean {
            TextCleaner::new()
                .with_remove_footnotes(!self.keep_footnotes)
                .with_remove_page_numbers(!self.keep_page_numbers)
        } else {
            TextCleaner::new()
                .with_remove_footnotes(false)
                .with_remove_page_numbers(false)
                .with_normalize_whitespace(false)
        }
    }
}

/// Extract chapter text from an EPUB
pub fn extract(input: &str, args: &ExtractArgs) -> Result<()> {
    if args.format_style.splits_text() && !args.clean {
        bail!(
            "--format-style {} cannot be used with --no-clean",
            args.format_style
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .unwrap_or_default()
        );
    }

    let options = ExtractorOptions::new()
        .with_paragraph_separator(args.format_style.paragraph_separator())
        .with_cleaner(args.cleaner());
    let extractor = open_book(input, options)?;

    let chapters = extractor.chapters(false)?;
    if chapters.is_empty() {
        warn!("No chapters found in {}", input);
        return Ok(());
    }

    let mut request = ChapterExtraction::new()
        .with_dedupe(args.dedupe)
        .with_skip_toc(args.skip_toc)
        .with_titles(args.titles);

    if let Some(range) = &args.chapters {
        let indices = parse_chapter_range(range)?;
        let ids: Vec<String> = indices
            .iter()
            .filter_map(|&i| chapters.get(i).map(|c| c.id.clone()))
            .collect();
        if ids.is_empty() {
            bail!(
                "Chapter range '{}' selects nothing (the book has {} chapters)",
                range,
                chapters.len()
            );
        }
        if ids.len() < indices.len() {
            warn!("Ignoring chapter numbers past {}", chapters.len());
        }
        request = request.with_ids(ids);
    }

    let text = extractor.extract_chapters(&request)?;
    let text = match args.format_style {
        FormatStyle::Compact => format_paragraphs(&text, "", false),
        FormatStyle::Readable => text,
        FormatStyle::Sentences => format_sentences(&text, "\n"),
        FormatStyle::Clauses => format_clauses(&text, "\n"),
    };
    let text = match args.max_length {
        Some(max_length) => split_long_lines(&text, max_length, ""),
        None => text,
    };

    info!("Extracted {} characters", text.chars().count());
    write_output(&text, args.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(clean: bool) -> ExtractArgs {
        ExtractArgs {
            output: None,
            chapters: None,
            format_style: FormatStyle::Readable,
            max_length: None,
            clean,
            keep_footnotes: false,
            keep_page_numbers: true,
            skip_toc: false,
            titles: false,
            dedupe: true,
        }
    }

    #[test]
    fn test_cleaner_flags() {
        let cleaned = args(true).cleaner().clean("Text[3] here.\n\n42\n\nMore.");
        assert_eq!(cleaned, "Text here.\n\n42\n\nMore.");

        let raw = args(false).cleaner().clean("Text[3]  here.");
        assert_eq!(raw, "Text[3]  here.");
    }

    #[test]
    fn test_sentences_require_cleaning() {
        let mut args = args(false);
        args.format_style = FormatStyle::Sentences;
        let err = extract("unused.epub", &args).unwrap_err();
        assert!(err.to_string().contains("--no-clean"));

        args.format_style = FormatStyle::Clauses;
        let err = extract("unused.epub", &args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--format-style clauses cannot be used with --no-clean"
        );
    }
}
