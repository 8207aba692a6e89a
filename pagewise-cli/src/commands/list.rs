//! List command implementation

use super::open_book;
use anyhow::Result;
use clap::ValueEnum;
use pagewise_core::{Chapter, ExtractorOptions};

/// Chapter listing layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Numbered table, one chapter per row
    Table,

    /// Indented by nesting level
    Tree,
}

/// List the chapters of an EPUB
pub fn list(input: &str, format: ListFormat, json: bool) -> Result<()> {
    let extractor = open_book(input, ExtractorOptions::default())?;
    let chapters = extractor.chapters(false)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chapters)?);
        return Ok(());
    }

    if chapters.is_empty() {
        println!("No chapters found.");
        return Ok(());
    }

    let output = match format {
        ListFormat::Table => render_table(&chapters),
        ListFormat::Tree => render_tree(&chapters),
    };
    print!("{}", output);
    Ok(())
}

fn render_table(chapters: &[Chapter]) -> String {
    let mut out = format!("{:>4}  {:<50}  {:>10}\n", "#", "Title", "Chars");
    for (i, chapter) in chapters.iter().enumerate() {
        let indent = "  ".repeat(chapter.level.saturating_sub(1) as usize);
        out.push_str(&format!(
            "{:>4}  {:<50}  {:>10}\n",
            i + 1,
            format!("{}{}", indent, chapter.title),
            chapter.char_count
        ));
    }
    let total: usize = chapters.iter().map(|c| c.char_count).sum();
    out.push_str(&format!("\n{} chapters, {} characters\n", chapters.len(), total));
    out
}

fn render_tree(chapters: &[Chapter]) -> String {
    let mut out = String::from("Chapters\n");
    for chapter in chapters {
        let indent = "  ".repeat(chapter.level.saturating_sub(1) as usize);
        out.push_str(&format!(
            "{}- {} ({} chars)\n",
            indent, chapter.title, chapter.char_count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters() -> Vec<Chapter> {
        vec![
            Chapter::new("a", "Part One").with_text("", 10),
            Chapter::new("b", "Scene").with_text("", 5).with_parent(Some("a".into()), 2),
        ]
    }

    #[test]
    fn test_render_tree() {
        assert_eq!(
            render_tree(&chapters()),
            "Chapters\n- Part One (10 chars)\n  - Scene (5 chars)\n"
        );
    }

    #[test]
    fn test_render_table_totals() {
        let table = render_table(&chapters());
        assert!(table.contains("Part One"));
        assert!(table.contains("  Scene"));
        assert!(table.ends_with("2 chapters, 15 characters\n"));
    }
}
