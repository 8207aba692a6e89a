//! Chapter type representing one navigation entry and its text

use serde::{Deserialize, Serialize};

/// Id given to the synthesized chapter holding content before the first anchor
pub const PREFIX_CHAPTER_ID: &str = "internal:prefix_content";

/// Title given to the synthesized prefix chapter
pub const PREFIX_CHAPTER_TITLE: &str = "Introduction";

/// A single chapter of a book, flattened from the navigation tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Navigation `src` (document#fragment), or a synthesized placeholder
    pub id: String,

    /// Chapter title from the navigation document
    pub title: String,

    /// Cleaned chapter text (empty when text was not requested)
    pub text: String,

    /// Length of the cleaned text in characters
    pub char_count: usize,

    /// Id of the enclosing chapter, if nested
    pub parent_id: Option<String>,

    /// Depth in the navigation tree (top level = 1)
    pub level: u32,
}

impl Chapter {
    /// Create a new top-level chapter with no text
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: String::new(),
            char_count: 0,
            parent_id: None,
            level: 1,
        }
    }

    /// Set the chapter text and its character count
    pub fn with_text(mut self, text: impl Into<String>, char_count: usize) -> Self {
        self.text = text.into();
        self.char_count = char_count;
        self
    }

    /// Set the parent chapter id and nesting level
    pub fn with_parent(mut self, parent_id: Option<String>, level: u32) -> Self {
        self.parent_id = parent_id;
        self.level = level;
        self
    }

    /// Whether this is the synthesized prefix chapter
    pub fn is_prefix(&self) -> bool {
        self.id == PREFIX_CHAPTER_ID
    }
}
