//! Raw markup slicing between two positions in spine order

use std::collections::HashMap;
use tracing::warn;

/// Spine documents and their decoded markup
#[derive(Debug, Clone, Default)]
pub struct SpineContent {
    spine: Vec<String>,
    documents: HashMap<String, String>,
}

impl SpineContent {
    pub fn new(spine: Vec<String>) -> Self {
        Self {
            spine,
            documents: HashMap::new(),
        }
    }

    /// Register a document's markup
    pub fn insert(&mut self, name: impl Into<String>, markup: impl Into<String>) {
        self.documents.insert(name.into(), markup.into());
    }

    /// Builder-style [`SpineContent::insert`]
    pub fn with_document(mut self, name: impl Into<String>, markup: impl Into<String>) -> Self {
        self.insert(name, markup);
        self
    }

    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    /// Index of a document in the spine
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.spine.iter().position(|doc| doc == name)
    }

    /// Markup of a document, empty when unknown
    pub fn document(&self, name: &str) -> &str {
        self.documents.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Raw markup from `(doc_a, pos_a)` up to `end`, or to the end of the spine
    ///
    /// When `doc_a` comes after the end document in spine order the slice wraps
    /// around the spine if `allow_wraparound` is set and is empty otherwise.
    pub fn slice(
        &self,
        doc_a: &str,
        pos_a: usize,
        end: Option<(&str, usize)>,
        allow_wraparound: bool,
    ) -> String {
        let markup_a = self.document(doc_a);
        if markup_a.is_empty() {
            return String::new();
        }

        let Some((doc_b, pos_b)) = end else {
            let mut out = tail(markup_a, pos_a).to_string();
            if let Some(idx_a) = self.spine_index_logged(doc_a) {
                for doc in &self.spine[idx_a + 1..] {
                    out.push_str(self.document(doc));
                }
            }
            return out;
        };

        if doc_a == doc_b {
            let start = clamp(markup_a, pos_a);
            let end = clamp(markup_a, pos_b);
            return if start < end {
                markup_a[start..end].to_string()
            } else {
                String::new()
            };
        }

        let (Some(idx_a), Some(idx_b)) = (self.spine_index_logged(doc_a), self.spine_index_logged(doc_b))
        else {
            return tail(markup_a, pos_a).to_string();
        };

        let between: Vec<&String> = if idx_a < idx_b {
            self.spine[idx_a + 1..idx_b].iter().collect()
        } else if allow_wraparound {
            self.spine[idx_a + 1..]
                .iter()
                .chain(self.spine[..idx_b].iter())
                .collect()
        } else {
            return String::new();
        };

        let mut out = tail(markup_a, pos_a).to_string();
        for doc in between {
            out.push_str(self.document(doc));
        }
        out.push_str(head(self.document(doc_b), pos_b));
        out
    }

    /// Markup from the start of the spine up to `(doc, pos)`
    pub fn prefix(&self, doc: &str, pos: usize) -> String {
        let Some(idx) = self.index_of(doc) else {
            return String::new();
        };
        let mut out = String::new();
        for name in &self.spine[..idx] {
            out.push_str(self.document(name));
        }
        out.push_str(head(self.document(doc), pos));
        out
    }

    fn spine_index_logged(&self, name: &str) -> Option<usize> {
        let index = self.index_of(name);
        if index.is_none() {
            warn!("Document '{}' not found in spine order", name);
        }
        index
    }
}

/// Clamp an offset to the text length and down to a char boundary
fn clamp(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn tail(text: &str, pos: usize) -> &str {
    &text[clamp(text, pos)..]
}

fn head(text: &str, pos: usize) -> &str {
    &text[..clamp(text, pos)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_docs() -> SpineContent {
        SpineContent::new(vec!["d1".into(), "d2".into(), "d3".into()])
            .with_document("d1", "AAA111BBB")
            .with_document("d2", "CCC222DDD")
            .with_document("d3", "EEE333FFF")
    }

    #[test]
    fn test_same_document() {
        let content = SpineContent::new(vec!["d".into()]).with_document("d", "AAA111BBB");
        assert_eq!(content.slice("d", 3, Some(("d", 6)), true), "111");
        assert_eq!(content.slice("d", 6, Some(("d", 3)), true), "");
    }

    #[test]
    fn test_across_intervening_document() {
        assert_eq!(
            three_docs().slice("d1", 6, Some(("d3", 3)), false),
            "BBBCCC222DDDEEE"
        );
    }

    #[test]
    fn test_last_anchor_takes_rest_of_spine() {
        assert_eq!(three_docs().slice("d2", 3, None, true), "222DDDEEE333FFF");
    }

    #[test]
    fn test_reverse_order_wraps_only_when_allowed() {
        let content = three_docs();
        assert_eq!(content.slice("d2", 6, Some(("d1", 3)), true), "DDDEEE333FFFAAA");
        assert_eq!(content.slice("d2", 6, Some(("d1", 3)), false), "");
    }

    #[test]
    fn test_off_spine_document_yields_tail() {
        let content = three_docs().with_document("notes", "NOTES-TEXT");
        assert_eq!(content.slice("notes", 6, Some(("d1", 0)), true), "TEXT");
        assert_eq!(content.slice("notes", 6, None, true), "TEXT");
    }

    #[test]
    fn test_offsets_clamped_to_char_boundaries() {
        let content = SpineContent::new(vec!["d".into()]).with_document("d", "aé b");
        assert_eq!(content.slice("d", 2, Some(("d", 99)), false), "é b");
        assert_eq!(content.slice("d", 0, Some(("d", 2)), false), "a");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(three_docs().prefix("d2", 3), "AAA111BBBCCC");
        assert_eq!(three_docs().prefix("d1", 0), "");
    }
}
