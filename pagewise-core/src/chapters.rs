//! Per-entry section texts and the flattened chapter tree

use crate::slicer::SpineContent;
use crate::text::text_length;
use crate::types::{Chapter, NavEntry, OrderedAnchor, PREFIX_CHAPTER_ID, PREFIX_CHAPTER_TITLE};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Cleaned text of one navigation entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub text: String,
    pub char_count: usize,
}

impl Section {
    fn new(text: String) -> Self {
        let char_count = text_length(&text);
        Self { text, char_count }
    }
}

/// Section texts keyed by navigation `src`, plus the text before the first anchor
#[derive(Debug, Clone, Default)]
pub struct SectionTexts {
    by_src: HashMap<String, Section>,
    prefix: Option<Section>,
}

impl SectionTexts {
    /// Slice and render the markup between consecutive anchors
    ///
    /// `anchors` must be in reading order. `render` turns a raw markup slice
    /// into cleaned text.
    pub fn build(
        anchors: &[OrderedAnchor],
        content: &SpineContent,
        render: impl Fn(&str) -> String,
    ) -> Self {
        let mut by_src = HashMap::with_capacity(anchors.len());

        for (i, anchor) in anchors.iter().enumerate() {
            let end = anchors
                .get(i + 1)
                .map(|next| (next.doc_href.as_str(), next.position));
            let markup = content.slice(&anchor.doc_href, anchor.position, end, true);

            let section = if markup.trim().is_empty() {
                warn!("No content for '{}'", anchor.src);
                Section::default()
            } else {
                Section::new(render(&markup))
            };
            debug!("Section '{}': {} chars", anchor.src, section.char_count);
            by_src.insert(anchor.src.clone(), section);
        }

        let prefix = anchors.first().and_then(|first| {
            let markup = content.prefix(&first.doc_href, first.position);
            if markup.trim().is_empty() {
                return None;
            }
            let text = render(&markup);
            (!text.is_empty()).then(|| Section::new(text))
        });

        Self { by_src, prefix }
    }

    pub fn get(&self, src: &str) -> Option<&Section> {
        self.by_src.get(src)
    }

    /// Text found before the first anchor, if any
    pub fn prefix(&self) -> Option<&Section> {
        self.prefix.as_ref()
    }

    pub fn len(&self) -> usize {
        self.by_src.len() + usize::from(self.prefix.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flatten the navigation tree into chapters in pre-order
///
/// Content before the first anchor becomes a leading "Introduction" chapter.
/// Without `include_text` chapter texts are left empty but `char_count` is
/// still filled in.
pub fn build_chapters(tree: &[NavEntry], sections: &SectionTexts, include_text: bool) -> Vec<Chapter> {
    let mut chapters = Vec::new();

    if let Some(prefix) = sections.prefix() {
        let text = if include_text { prefix.text.as_str() } else { "" };
        chapters.push(
            Chapter::new(PREFIX_CHAPTER_ID, PREFIX_CHAPTER_TITLE).with_text(text, prefix.char_count),
        );
    }

    walk(tree, None, 1, sections, include_text, &mut chapters);
    chapters
}

fn walk(
    entries: &[NavEntry],
    parent_id: Option<&str>,
    level: u32,
    sections: &SectionTexts,
    include_text: bool,
    chapters: &mut Vec<Chapter>,
) {
    for entry in entries {
        let id = entry
            .src
            .clone()
            .unwrap_or_else(|| format!("chapter_{}", chapters.len()));
        let section = entry.src.as_deref().and_then(|src| sections.get(src));

        let (text, char_count) = match section {
            Some(section) if include_text => (section.text.clone(), section.char_count),
            Some(section) => (String::new(), section.char_count),
            None => (String::new(), 0),
        };

        chapters.push(
            Chapter::new(id.clone(), entry.title.clone())
                .with_text(text, char_count)
                .with_parent(parent_id.map(str::to_string), level),
        );

        walk(&entry.children, Some(&id), level + 1, sections, include_text, chapters);
    }
}
