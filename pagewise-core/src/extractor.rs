//! Extraction facade: chapters, pages and assembled text for one container

use crate::chapters::{build_chapters, SectionTexts};
use crate::container::{Container, ItemKind};
use crate::error::Result;
use crate::heuristics::{
    is_front_matter_title, is_toc_or_front_matter, remove_duplicate_title, strip_toc, KnownTitles,
};
use crate::navigation::{find_page_list, Navigation, PageList};
use crate::pages::{page_list_pages, synthetic_pages, ChapterIndex, DEFAULT_PAGE_SIZE};
use crate::slicer::SpineContent;
use crate::text::{render_text, TextCleaner};
use crate::types::{Chapter, Metadata, Page};
use regex::Regex;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// Rendering options fixed for the lifetime of an extractor
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    paragraph_separator: String,
    cleaner: TextCleaner,
}

impl ExtractorOptions {
    /// Blank-line paragraph separators; footnote markers removed, bare
    /// numbers kept
    pub fn new() -> Self {
        Self {
            paragraph_separator: "\n\n".to_string(),
            cleaner: TextCleaner::new().with_remove_page_numbers(false),
        }
    }

    /// Separator appended after every block element
    pub fn with_paragraph_separator(mut self, separator: impl Into<String>) -> Self {
        self.paragraph_separator = separator.into();
        self
    }

    /// Cleaner applied to rendered text
    pub fn with_cleaner(mut self, cleaner: TextCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn paragraph_separator(&self) -> &str {
        &self.paragraph_separator
    }

    /// Render a markup slice and clean the result
    ///
    /// Single newlines survive cleaning when they are the paragraph separator.
    pub fn render(&self, markup: &str) -> String {
        let text = render_text(markup, &self.paragraph_separator);
        if self.paragraph_separator == "\n" && !self.cleaner.preserves_single_newlines() {
            self.cleaner
                .clone()
                .with_preserve_single_newlines(true)
                .clean(&text)
        } else {
            self.cleaner.clean(&text)
        }
    }
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Which chapters to assemble and how
#[derive(Debug, Clone)]
pub struct ChapterExtraction {
    /// Chapter ids to include, all when `None`
    pub ids: Option<Vec<String>>,

    /// Drop a first line repeating the chapter title
    pub dedupe: bool,

    /// Leave out table of contents and front matter chapters
    pub skip_toc: bool,

    /// Emit a `<<CHAPTER: title>>` marker before each chapter
    pub include_titles: bool,
}

impl ChapterExtraction {
    pub fn new() -> Self {
        Self {
            ids: None,
            dedupe: true,
            skip_toc: false,
            include_titles: false,
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn with_skip_toc(mut self, skip_toc: bool) -> Self {
        self.skip_toc = skip_toc;
        self
    }

    pub fn with_titles(mut self, include_titles: bool) -> Self {
        self.include_titles = include_titles;
        self
    }
}

impl Default for ChapterExtraction {
    fn default() -> Self {
        Self::new()
    }
}

/// Which pages to assemble and how
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// Page labels to include in the given order, all when `None`
    pub numbers: Option<Vec<String>>,

    /// Drop a first line repeating the chapter title
    pub dedupe: bool,

    /// Skip front matter pages and strip title listings
    pub skip_toc: bool,

    /// Synthetic page budget, used when the book has no page-list
    pub page_size: usize,

    /// Count the budget in words instead of characters
    pub use_words: bool,
}

impl PageExtraction {
    pub fn new() -> Self {
        Self {
            numbers: None,
            dedupe: true,
            skip_toc: false,
            page_size: DEFAULT_PAGE_SIZE,
            use_words: false,
        }
    }

    pub fn with_numbers(mut self, numbers: Vec<String>) -> Self {
        self.numbers = Some(numbers);
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    pub fn with_skip_toc(mut self, skip_toc: bool) -> Self {
        self.skip_toc = skip_toc;
        self
    }

    pub fn with_page_size(mut self, page_size: usize, use_words: bool) -> Self {
        self.page_size = page_size;
        self.use_words = use_words;
        self
    }
}

impl Default for PageExtraction {
    fn default() -> Self {
        Self::new()
    }
}

/// Processed navigation state, built once per extractor
#[derive(Debug)]
struct NavCache {
    content: SpineContent,
    navigation: Navigation,
    sections: SectionTexts,
    chapter_index: ChapterIndex,
}

impl NavCache {
    fn process(container: &Container, options: &ExtractorOptions) -> Result<Self> {
        info!("Processing navigation");

        let mut content = SpineContent::new(container.spine().to_vec());
        for item in container.items() {
            if item.kind == ItemKind::Document || container.spine().contains(&item.name) {
                content.insert(item.name.clone(), item.content_str().into_owned());
            }
        }

        let navigation = Navigation::load(container, &content)?;
        let sections = SectionTexts::build(&navigation.anchors, &content, |markup| {
            options.render(markup)
        });
        let chapter_index = ChapterIndex::new(&navigation.anchors);

        info!("Finished processing, {} sections", sections.len());
        Ok(Self {
            content,
            navigation,
            sections,
            chapter_index,
        })
    }
}

/// Navigation-ordered text extraction for one EPUB
///
/// Navigation is processed on first use and cached; every query after that
/// works from the cache.
#[derive(Debug)]
pub struct EpubExtractor {
    container: Container,
    options: ExtractorOptions,
    cache: OnceCell<NavCache>,
    page_list: OnceCell<Option<PageList>>,
    known_titles: OnceCell<KnownTitles>,
    metadata: OnceCell<Metadata>,
}

impl EpubExtractor {
    /// Open an EPUB with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ExtractorOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ExtractorOptions) -> Result<Self> {
        let container = Container::open(path)?;
        Ok(Self::new(container, options))
    }

    /// Wrap an already opened container
    pub fn new(container: Container, options: ExtractorOptions) -> Self {
        Self {
            container,
            options,
            cache: OnceCell::new(),
            page_list: OnceCell::new(),
            known_titles: OnceCell::new(),
            metadata: OnceCell::new(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    fn ensure_processed(&self) -> Result<&NavCache> {
        if let Some(cache) = self.cache.get() {
            return Ok(cache);
        }
        let cache = NavCache::process(&self.container, &self.options)?;
        Ok(self.cache.get_or_init(|| cache))
    }

    /// The resolved navigation (document, tree and ordered anchors)
    pub fn navigation(&self) -> Result<&Navigation> {
        Ok(&self.ensure_processed()?.navigation)
    }

    /// Dublin Core metadata
    pub fn metadata(&self) -> &Metadata {
        self.metadata.get_or_init(|| {
            let first = |field: &str| self.container.metadata(field).first().map(|v| v.to_string());
            let all = |field: &str| {
                self.container
                    .metadata(field)
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            };

            let publication_year = first("date").map(|date| {
                YEAR_RE
                    .find(&date)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or(date)
            });

            Metadata {
                title: first("title"),
                authors: all("creator"),
                description: first("description"),
                publisher: first("publisher"),
                publication_year,
                identifier: first("identifier"),
                language: first("language"),
                contributors: all("contributor"),
                rights: first("rights"),
                coverage: first("coverage"),
            }
        })
    }

    /// Chapters in navigation order, with or without their text
    pub fn chapters(&self, include_text: bool) -> Result<Vec<Chapter>> {
        let cache = self.ensure_processed()?;
        Ok(build_chapters(
            &cache.navigation.tree,
            &cache.sections,
            include_text,
        ))
    }

    /// Upper-cased book and chapter titles
    fn known_titles(&self) -> Result<&KnownTitles> {
        if let Some(titles) = self.known_titles.get() {
            return Ok(titles);
        }
        let chapters = self.chapters(false)?;
        let titles = KnownTitles::new(
            self.metadata().title.as_deref(),
            chapters.iter().map(|c| c.title.as_str()),
        );
        Ok(self.known_titles.get_or_init(|| titles))
    }

    /// Assemble the text of the selected chapters
    pub fn extract_chapters(&self, request: &ChapterExtraction) -> Result<String> {
        let chapters = self.chapters(true)?;
        let wanted: Option<HashSet<&str>> = request
            .ids
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());

        let known = if request.skip_toc {
            Some(self.known_titles()?)
        } else {
            None
        };

        let mut parts = Vec::new();
        for chapter in &chapters {
            if let Some(wanted) = &wanted {
                if !wanted.contains(chapter.id.as_str()) {
                    continue;
                }
            }
            if let Some(known) = known {
                if is_toc_or_front_matter(&chapter.text, Some(&chapter.title), known) {
                    debug!("Skipping front matter chapter '{}'", chapter.title);
                    continue;
                }
            }
            if chapter.text.is_empty() {
                continue;
            }

            let text = if request.dedupe {
                remove_duplicate_title(&chapter.text, &chapter.title)
            } else {
                chapter.text.clone()
            };
            let text = text.trim();

            if request.include_titles {
                parts.push(format!("<<CHAPTER: {}>>\n\n{}", chapter.title, text));
            } else if !text.is_empty() {
                parts.push(text.to_string());
            }
        }

        Ok(parts.join("\n\n"))
    }

    /// Cached page-list lookup
    fn page_list(&self) -> Option<&PageList> {
        self.page_list
            .get_or_init(|| find_page_list(&self.container))
            .as_ref()
    }

    /// Whether the book ships a page-list with at least one entry
    pub fn has_page_list(&self) -> bool {
        self.page_list().is_some()
    }

    /// Pages from the page-list when present, synthetic pages otherwise
    pub fn pages(&self, page_size: usize, use_words: bool) -> Result<Vec<Page>> {
        let cache = self.ensure_processed()?;

        if let Some(list) = self.page_list() {
            let pages = page_list_pages(list, &cache.content, &cache.chapter_index, |markup| {
                self.options.render(markup)
            });
            if !pages.is_empty() {
                info!("Found {} pages from page-list", pages.len());
                return Ok(pages);
            }
        }

        info!("No page-list found, generating synthetic pages");
        let chapters = self.chapters(true)?;
        Ok(synthetic_pages(&chapters, page_size, use_words))
    }

    /// Assemble the text of the selected pages with page and chapter markers
    pub fn extract_pages(&self, request: &PageExtraction) -> Result<String> {
        let pages = self.pages(request.page_size, request.use_words)?;

        let selected: Vec<&Page> = match &request.numbers {
            None => pages.iter().collect(),
            Some(numbers) => numbers
                .iter()
                .filter_map(|number| pages.iter().find(|page| page.page_number == *number))
                .collect(),
        };

        let known = if request.skip_toc {
            Some(self.known_titles()?)
        } else {
            None
        };

        let mut parts = Vec::new();
        let mut current_chapter: Option<&str> = None;

        for page in selected {
            if page.text.is_empty() {
                continue;
            }

            let mut text = page.text.clone();
            if let Some(known) = known {
                if page.chapter_title.as_deref().map(is_front_matter_title).unwrap_or(false) {
                    continue;
                }
                text = strip_toc(&text, known);
                if text.trim().is_empty() {
                    continue;
                }
            }

            if let Some(title) = page.chapter_title.as_deref() {
                if current_chapter != Some(title) {
                    current_chapter = Some(title);
                    parts.push(format!("<<CHAPTER: {}>>", title));
                }
            }

            let text = match page.chapter_title.as_deref() {
                Some(title) if request.dedupe => remove_duplicate_title(&text, title),
                _ => text,
            };
            parts.push(format!("<<PAGE: {}>>\n\n{}", page.page_number, text.trim()));
        }

        Ok(parts.join("\n\n"))
    }
}
