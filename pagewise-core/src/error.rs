//! Error types for Pagewise Core

use thiserror::Error;

/// Result type alias using PagewiseError
pub type Result<T> = std::result::Result<T, PagewiseError>;

/// Top-level error type for all extraction operations
///
/// Each variant names the stage that failed, so a malformed source file can be
/// diagnosed from the message alone.
#[derive(Debug, Error)]
pub enum PagewiseError {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

/// Errors that occur while opening the EPUB container
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid EPUB container: {0}")]
    Invalid(String),
}

/// Errors that occur while discovering or parsing the navigation document
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("No navigation document (NAV HTML or NCX) found")]
    NotFound,

    #[error("No valid navigation entries found after parsing {0}")]
    NoValidEntries(String),

    #[error("Malformed navigation document {name}: {reason}")]
    Malformed { name: String, reason: String },
}
