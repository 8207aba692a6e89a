//! Info command implementation

use super::open_book;
use anyhow::Result;
use pagewise_core::ExtractorOptions;
use serde::Serialize;

/// Longest description shown in the text output
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    publication_year: Option<String>,
    language: Option<String>,
    description: Option<String>,
    navigation: String,
    chapters: usize,
    total_chars: usize,
    has_page_list: bool,
}

/// Display information about an EPUB
pub fn info(input: &str, json: bool) -> Result<()> {
    let extractor = open_book(input, ExtractorOptions::default())?;

    let metadata = extractor.metadata();
    let chapters = extractor.chapters(false)?;

    let info = BookInfo {
        title: metadata.title.clone(),
        authors: metadata.authors.clone(),
        publisher: metadata.publisher.clone(),
        publication_year: metadata.publication_year.clone(),
        language: metadata.language.clone(),
        description: metadata.description.clone(),
        navigation: extractor.navigation()?.document.clone(),
        chapters: chapters.len(),
        total_chars: chapters.iter().map(|c| c.char_count).sum(),
        has_page_list: extractor.has_page_list(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    if let Some(title) = &info.title {
        println!("Title:       {}", title);
    }
    if !info.authors.is_empty() {
        println!("Authors:     {}", info.authors.join(", "));
    }
    if let Some(publisher) = &info.publisher {
        println!("Publisher:   {}", publisher);
    }
    if let Some(year) = &info.publication_year {
        println!("Year:        {}", year);
    }
    if let Some(language) = &info.language {
        println!("Language:    {}", language);
    }
    if let Some(desc) = &info.description {
        if desc.chars().count() > DESCRIPTION_PREVIEW_CHARS {
            let preview: String = desc.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            println!("Description: {}...", preview);
        } else {
            println!("Description: {}", desc);
        }
    }
    println!("Navigation:  {}", info.navigation);
    println!("Chapters:    {}", info.chapters);
    println!("Characters:  {}", info.total_chars);
    println!(
        "Page list:   {}",
        if info.has_page_list { "yes" } else { "no" }
    );

    Ok(())
}
