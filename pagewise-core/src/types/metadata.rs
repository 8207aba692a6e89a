//! Book metadata types (Dublin Core fields)

use serde::{Deserialize, Serialize};

/// Bibliographic metadata read from the package document
///
/// Every field is optional; EPUBs in the wild omit almost any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    /// Book title
    pub title: Option<String>,

    /// Authors/creators
    pub authors: Vec<String>,

    /// Book description/summary
    pub description: Option<String>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Publication year (or the raw date when no year could be found)
    pub publication_year: Option<String>,

    /// ISBN, UUID or other identifier
    pub identifier: Option<String>,

    /// Language code
    pub language: Option<String>,

    /// Other contributors (editors, illustrators, ...)
    pub contributors: Vec<String>,

    /// Copyright/rights information
    pub rights: Option<String>,

    /// Spatial or temporal coverage
    pub coverage: Option<String>,
}

impl Metadata {
    /// Create metadata with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Add an author/creator
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Get the primary author (first creator)
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(|s| s.as_str())
    }
}
