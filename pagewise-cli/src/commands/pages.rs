//! Pages command implementation

use super::{open_book, parse_page_labels, write_output};
use anyhow::Result;
use pagewise_core::{ExtractorOptions, Page, PageExtraction};
use tracing::info;

/// Flags of the pages command
#[derive(Debug, Clone)]
pub struct PagesArgs {
    pub output: Option<String>,
    pub pages: Option<String>,
    pub page_size: usize,
    pub words: bool,
    pub skip_toc: bool,
    pub dedupe: bool,
    pub list: bool,
}

/// Extract page text from an EPUB, or list its pages
pub fn pages(input: &str, args: &PagesArgs) -> Result<()> {
    let extractor = open_book(input, ExtractorOptions::default())?;

    if args.list {
        let pages = extractor.pages(args.page_size, args.words)?;
        print!("{}", render_listing(&pages));
        return Ok(());
    }

    let mut request = PageExtraction::new()
        .with_dedupe(args.dedupe)
        .with_skip_toc(args.skip_toc)
        .with_page_size(args.page_size, args.words);
    if let Some(labels) = &args.pages {
        request = request.with_numbers(parse_page_labels(labels));
    }

    let text = extractor.extract_pages(&request)?;
    info!("Extracted {} characters", text.chars().count());
    write_output(&text, args.output.as_deref())
}

fn render_listing(pages: &[Page]) -> String {
    let mut out = match pages.first() {
        Some(first) => format!("{} pages ({})\n", pages.len(), first.source),
        None => "0 pages\n".to_string(),
    };
    out.push_str(&format!("{:>8}  {:>8}  {}\n", "Page", "Chars", "Chapter"));
    for page in pages {
        out.push_str(&format!(
            "{:>8}  {:>8}  {}\n",
            page.page_number,
            page.char_count,
            page.chapter_title.as_deref().unwrap_or("-")
        ));
    }
    out
}
