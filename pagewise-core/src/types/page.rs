//! Page types: print pages from a page-list, or synthetic pages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a page boundary came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageSource {
    /// A page-list navigation structure shipped in the container
    Real,

    /// Size-budgeted pagination generated from chapter text
    Synthetic,
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSource::Real => f.write_str("page-list"),
            PageSource::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// A single page of text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Page label. Literal for page-list pages (may be "xiv"), "1", "2", ... otherwise
    pub page_number: String,

    /// Cleaned page text
    pub text: String,

    /// Length of the cleaned text in characters
    pub char_count: usize,

    /// Origin of the page boundaries
    pub source: PageSource,

    /// Id of the chapter the page belongs to
    pub chapter_id: Option<String>,

    /// Title of the chapter the page belongs to
    pub chapter_title: Option<String>,
}

impl Page {
    pub fn new(
        page_number: impl Into<String>,
        text: impl Into<String>,
        char_count: usize,
        source: PageSource,
    ) -> Self {
        Self {
            page_number: page_number.into(),
            text: text.into(),
            char_count,
            source,
            chapter_id: None,
            chapter_title: None,
        }
    }

    /// Attach the owning chapter
    pub fn with_chapter(mut self, chapter_id: Option<String>, chapter_title: Option<String>) -> Self {
        self.chapter_id = chapter_id;
        self.chapter_title = chapter_title;
        self
    }
}
