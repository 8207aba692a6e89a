//! Text collaborators: markup rendering, cleaning, segmentation and formatting

pub mod cleaner;
pub mod format;
pub mod markup;
pub mod segment;

pub use cleaner::{text_length, TextCleaner};
pub use format::{format_clauses, format_paragraphs, format_sentences, split_long_lines};
pub use markup::render_text;
pub use segment::{split_clauses, split_paragraphs, split_sentences};
