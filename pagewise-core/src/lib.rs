//! Pagewise Core Library
//!
//! Navigation-ordered text extraction from EPUB files. The navigation
//! document (EPUB 3 `nav` or EPUB 2 NCX) decides what a chapter is: every
//! entry is located in the spine, entries are sorted into reading order and
//! the markup between consecutive entries becomes that entry's text.
//!
//! Pages come from the book's page-list when it has one, otherwise they are
//! generated by filling sentences up to a size budget.
//!
//! ```no_run
//! use pagewise_core::{EpubExtractor, PageExtraction};
//!
//! let extractor = EpubExtractor::open("book.epub")?;
//! for chapter in extractor.chapters(false)? {
//!     println!("{} ({} chars)", chapter.title, chapter.char_count);
//! }
//! let text = extractor.extract_pages(&PageExtraction::new().with_skip_toc(true))?;
//! # Ok::<(), pagewise_core::PagewiseError>(())
//! ```

pub mod chapters;
pub mod container;
pub mod error;
pub mod extractor;
pub mod heuristics;
pub mod locator;
pub mod navigation;
pub mod pages;
pub mod slicer;
pub mod text;
pub mod types;

pub use container::{Container, Item, ItemKind};
pub use error::{ContainerError, NavigationError, PagewiseError, Result};
pub use extractor::{ChapterExtraction, EpubExtractor, ExtractorOptions, PageExtraction};
pub use navigation::{NavSchema, Navigation, PageList, PageTarget};
pub use pages::DEFAULT_PAGE_SIZE;
pub use text::TextCleaner;
pub use types::{Chapter, Metadata, NavEntry, OrderedAnchor, Page, PageSource};
