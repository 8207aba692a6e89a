//! Navigation types shared by both navigation schemas

use serde::{Deserialize, Serialize};

/// A single entry in the navigation tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavEntry {
    /// Display title
    pub title: String,

    /// Link target as written in the navigation document (document#fragment)
    pub src: Option<String>,

    /// Whether `src` resolved to a spine document
    pub has_content: bool,

    /// Child entries for nested navigation
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    /// Create a new navigation entry
    pub fn new(title: impl Into<String>, src: Option<String>) -> Self {
        Self {
            title: title.into(),
            src,
            has_content: false,
            children: Vec::new(),
        }
    }

    /// Add a single child entry
    pub fn add_child(&mut self, child: NavEntry) {
        self.children.push(child);
    }

    /// Number of entries in this subtree, including this one
    pub fn entry_count(&self) -> usize {
        1 + self.children.iter().map(NavEntry::entry_count).sum::<usize>()
    }
}

/// A navigation entry resolved to a position in the spine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedAnchor {
    /// Link target as written in the navigation document
    pub src: String,

    /// Entry title (or page label for page-list anchors)
    pub title: String,

    /// Spine document the anchor lives in
    pub doc_href: String,

    /// Byte offset of the anchor inside the document's raw markup
    pub position: usize,

    /// Index of `doc_href` in the spine
    pub doc_order: usize,
}

impl OrderedAnchor {
    /// Global reading-order key
    pub fn sort_key(&self) -> (usize, usize) {
        (self.doc_order, self.position)
    }
}
