//! Core types for extracted book content

mod chapter;
mod metadata;
mod nav;
mod page;

pub use chapter::{Chapter, PREFIX_CHAPTER_ID, PREFIX_CHAPTER_TITLE};
pub use metadata::Metadata;
pub use nav::{NavEntry, OrderedAnchor};
pub use page::{Page, PageSource};
