//! Page model: print pages from a page-list, or synthetic pagination
//!
//! Synthetic pages are filled sentence by sentence up to a size budget, so a
//! sentence is never split across pages and no page spans two chapters.

use crate::navigation::{resolve_anchor, split_src, HrefResolver, PageList};
use crate::slicer::SpineContent;
use crate::text::{split_paragraphs, split_sentences, text_length};
use crate::types::{Chapter, OrderedAnchor, Page, PageSource};
use tracing::{debug, warn};

/// Default synthetic page size in characters
pub const DEFAULT_PAGE_SIZE: usize = 2000;

/// Chapter start positions in reading order, for mapping pages to chapters
#[derive(Debug, Clone, Default)]
pub struct ChapterIndex {
    starts: Vec<OrderedAnchor>,
}

impl ChapterIndex {
    /// Index navigation anchors, sorting them by `(doc_order, position)`
    pub fn new(anchors: &[OrderedAnchor]) -> Self {
        let mut starts = anchors.to_vec();
        starts.sort_by_key(OrderedAnchor::sort_key);
        Self { starts }
    }

    /// Chapter id and title owning a position: the chapter in the same
    /// document with the greatest start at or before it
    pub fn owner(&self, doc_href: &str, position: usize) -> Option<(&str, &str)> {
        self.starts
            .iter()
            .rev()
            .find(|start| start.doc_href == doc_href && start.position <= position)
            .map(|start| (start.src.as_str(), start.title.as_str()))
    }
}

/// Pages from a page-list, text sliced between consecutive page anchors
///
/// Anchors in documents outside the spine sort last and get empty text.
pub fn page_list_pages(
    list: &PageList,
    content: &SpineContent,
    index: &ChapterIndex,
    render: impl Fn(&str) -> String,
) -> Vec<Page> {
    let resolver = HrefResolver::new(&list.document, content.spine());

    let mut anchors: Vec<OrderedAnchor> = list
        .targets
        .iter()
        .map(|target| {
            resolve_anchor(&resolver, content, &target.src, &target.label).unwrap_or_else(|| {
                warn!("Page '{}' points outside the spine: {}", target.label, target.src);
                OrderedAnchor {
                    src: target.src.clone(),
                    title: target.label.clone(),
                    doc_href: split_src(&target.src).0.to_string(),
                    position: 0,
                    doc_order: usize::MAX,
                }
            })
        })
        .collect();
    anchors.sort_by_key(OrderedAnchor::sort_key);

    anchors
        .iter()
        .enumerate()
        .map(|(i, anchor)| {
            let end = anchors
                .get(i + 1)
                .map(|next| (next.doc_href.as_str(), next.position));
            let markup = content.slice(&anchor.doc_href, anchor.position, end, false);
            let text = if markup.trim().is_empty() {
                String::new()
            } else {
                render(&markup)
            };

            let owner = index.owner(&anchor.doc_href, anchor.position);
            Page::new(anchor.title.clone(), text.clone(), text_length(&text), PageSource::Real)
                .with_chapter(
                    owner.map(|(id, _)| id.to_string()),
                    owner.map(|(_, title)| title.to_string()),
                )
        })
        .collect()
}

/// A pagination unit
#[derive(Debug, Clone, PartialEq, Eq)]
enum Unit {
    Sentence(String),
    ParagraphBreak,
}

/// Sentences of every paragraph, with a break marker between paragraphs
fn sentence_units(text: &str) -> Vec<Unit> {
    let paragraphs = split_paragraphs(text);
    let mut units = Vec::new();
    for (i, paragraph) in paragraphs.iter().enumerate() {
        units.extend(split_sentences(paragraph).into_iter().map(Unit::Sentence));
        if i + 1 < paragraphs.len() {
            units.push(Unit::ParagraphBreak);
        }
    }
    units
}

/// Accumulates sentence units into synthetic pages
struct Paginator {
    page_size: usize,
    use_words: bool,
    pages: Vec<Page>,
    current: Vec<Unit>,
    current_size: usize,
    has_sentence: bool,
    chapter: Option<(String, String)>,
}

impl Paginator {
    fn new(page_size: usize, use_words: bool) -> Self {
        Self {
            page_size: page_size.max(1),
            use_words,
            pages: Vec::new(),
            current: Vec::new(),
            current_size: 0,
            has_sentence: false,
            chapter: None,
        }
    }

    fn size_of(&self, text: &str) -> usize {
        if self.use_words {
            text.split_whitespace().count()
        } else {
            text.chars().count()
        }
    }

    fn start_chapter(&mut self, chapter: &Chapter) {
        let changed = self
            .chapter
            .as_ref()
            .map(|(id, title)| *id != chapter.id || *title != chapter.title)
            .unwrap_or(true);
        if changed {
            self.flush();
            self.chapter = Some((chapter.id.clone(), chapter.title.clone()));
        }
    }

    fn push(&mut self, unit: Unit) {
        match unit {
            Unit::ParagraphBreak => {
                // A page never starts with a paragraph break
                if self.has_sentence {
                    self.current.push(Unit::ParagraphBreak);
                }
            }
            Unit::Sentence(sentence) => {
                let size = self.size_of(&sentence);
                if size > self.page_size && !self.has_sentence {
                    self.current.clear();
                    self.emit(sentence);
                    return;
                }
                if self.current_size + size > self.page_size && self.has_sentence {
                    self.flush();
                }
                self.current.push(Unit::Sentence(sentence));
                self.current_size += size;
                self.has_sentence = true;
            }
        }
    }

    fn flush(&mut self) {
        if !self.has_sentence {
            self.current.clear();
            return;
        }

        let mut text = String::new();
        let mut after_break = true;
        for unit in self.current.drain(..) {
            match unit {
                Unit::ParagraphBreak => {
                    text.push_str("\n\n");
                    after_break = true;
                }
                Unit::Sentence(sentence) => {
                    if !after_break {
                        text.push(' ');
                    }
                    text.push_str(&sentence);
                    after_break = false;
                }
            }
        }
        self.current_size = 0;
        self.has_sentence = false;
        self.emit(text.trim().to_string());
    }

    fn emit(&mut self, text: String) {
        let number = (self.pages.len() + 1).to_string();
        let (chapter_id, chapter_title) = match &self.chapter {
            Some((id, title)) => (Some(id.clone()), Some(title.clone())),
            None => (None, None),
        };
        let char_count = text_length(&text);
        self.pages.push(
            Page::new(number, text, char_count, PageSource::Synthetic)
                .with_chapter(chapter_id, chapter_title),
        );
    }

    fn finish(mut self) -> Vec<Page> {
        self.flush();
        self.pages
    }
}

/// Paginate chapter texts into pages of at most `page_size` characters (or
/// words with `use_words`), except where a single sentence is larger
pub fn synthetic_pages(chapters: &[Chapter], page_size: usize, use_words: bool) -> Vec<Page> {
    let mut paginator = Paginator::new(page_size, use_words);

    for chapter in chapters.iter().filter(|c| !c.text.is_empty()) {
        paginator.start_chapter(chapter);
        for unit in sentence_units(&chapter.text) {
            paginator.push(unit);
        }
    }

    let pages = paginator.finish();
    debug!("Generated {} synthetic pages", pages.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::PageTarget;
    use proptest::prelude::*;

    fn chapter(id: &str, text: &str) -> Chapter {
        Chapter::new(id, id.to_uppercase()).with_text(text, text.chars().count())
    }

    #[test]
    fn test_sentence_units_mark_paragraphs() {
        let units = sentence_units("One. Two.\n\nThree.");
        assert_eq!(
            units,
            vec![
                Unit::Sentence("One.".into()),
                Unit::Sentence("Two.".into()),
                Unit::ParagraphBreak,
                Unit::Sentence("Three.".into()),
            ]
        );
    }

    #[test]
    fn test_synthetic_budget_and_paragraphs() {
        let chapters = vec![chapter("c1", "Aaaa aaaa. Bbbb bbbb.\n\nCccc cccc. Dddd dddd.")];
        let pages = synthetic_pages(&chapters, 25, false);
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Aaaa aaaa. Bbbb bbbb.", "Cccc cccc. Dddd dddd."]);
        assert_eq!(pages[1].page_number, "2");
        assert!(pages.iter().all(|p| p.source == PageSource::Synthetic));

        let one_page = synthetic_pages(&chapters, 1000, false);
        assert_eq!(one_page.len(), 1);
        assert_eq!(one_page[0].text, "Aaaa aaaa. Bbbb bbbb.\n\nCccc cccc. Dddd dddd.");
    }

    #[test]
    fn test_oversized_sentence_gets_own_page() {
        let chapters = vec![chapter("c1", "Short. This sentence is far too long for the page. End.")];
        let pages = synthetic_pages(&chapters, 10, false);
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Short.", "This sentence is far too long for the page.", "End."]
        );
    }

    #[test]
    fn test_chapter_change_flushes() {
        let chapters = vec![
            chapter("c1", "First."),
            chapter("c2", ""),
            chapter("c3", "Second."),
        ];
        let pages = synthetic_pages(&chapters, 1000, false);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].chapter_id.as_deref(), Some("c1"));
        assert_eq!(pages[1].chapter_id.as_deref(), Some("c3"));
        assert_eq!(pages[1].chapter_title.as_deref(), Some("C3"));
    }

    #[test]
    fn test_word_budget() {
        let chapters = vec![chapter("c1", "One two three. Four five. Six seven eight nine.")];
        let pages = synthetic_pages(&chapters, 5, true);
        let texts: Vec<&str> = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["One two three. Four five.", "Six seven eight nine."]);
    }

    #[test]
    fn test_chapter_index_owner() {
        let anchor = |src: &str, doc: &str, position: usize, doc_order: usize| OrderedAnchor {
            src: src.into(),
            title: src.to_uppercase(),
            doc_href: doc.into(),
            position,
            doc_order,
        };
        let index = ChapterIndex::new(&[
            anchor("b", "b", 0, 1),
            anchor("a#2", "a", 50, 0),
            anchor("a", "a", 0, 0),
        ]);
        assert_eq!(index.owner("a", 10), Some(("a", "A")));
        assert_eq!(index.owner("a", 50), Some(("a#2", "A#2")));
        assert_eq!(index.owner("b", 99), Some(("b", "B")));
        assert_eq!(index.owner("c", 0), None);
    }

    #[test]
    fn test_page_list_pages_keep_literal_numbers() {
        let content = SpineContent::new(vec!["a.xhtml".into(), "b.xhtml".into()])
            .with_document("a.xhtml", r#"<span id="pi"/>roman<span id="p1"/>one"#)
            .with_document("b.xhtml", r#"<span id="p2"/>two"#);
        let list = PageList {
            document: "nav.xhtml".into(),
            targets: vec![
                PageTarget { label: "2".into(), src: "b.xhtml#p2".into() },
                PageTarget { label: "i".into(), src: "a.xhtml#pi".into() },
                PageTarget { label: "1".into(), src: "a.xhtml#p1".into() },
                PageTarget { label: "x".into(), src: "missing.xhtml".into() },
            ],
        };
        let index = ChapterIndex::new(&[OrderedAnchor {
            src: "a.xhtml".into(),
            title: "Chapter A".into(),
            doc_href: "a.xhtml".into(),
            position: 0,
            doc_order: 0,
        }]);

        let strip_tags = |markup: &str| markup.split(['<', '>']).step_by(2).collect::<String>();
        let pages = page_list_pages(&list, &content, &index, strip_tags);

        let numbers: Vec<&str> = pages.iter().map(|p| p.page_number.as_str()).collect();
        assert_eq!(numbers, vec!["i", "1", "2", "x"]);
        assert_eq!(pages[0].text, "roman");
        assert_eq!(pages[1].text, "one");
        assert_eq!(pages[2].text, "two");
        assert_eq!(pages[3].text, "");
        assert_eq!(pages[0].chapter_title.as_deref(), Some("Chapter A"));
        assert_eq!(pages[2].chapter_id, None);
        assert!(pages.iter().all(|p| p.source == PageSource::Real));
    }

    fn sentence_strategy() -> impl Strategy<Value = String> {
        (
            "[A-Z][a-z]{0,8}",
            prop::collection::vec("[a-z]{1,8}", 0..8),
            prop_oneof![Just("."), Just("!"), Just("?")],
        )
            .prop_map(|(first, rest, end)| {
                let mut words = vec![first];
                words.extend(rest);
                format!("{}{}", words.join(" "), end)
            })
    }

    proptest! {
        #[test]
        fn prop_pages_never_split_sentences(
            paragraphs in prop::collection::vec(prop::collection::vec(sentence_strategy(), 1..6), 1..5),
            page_size in 1usize..200,
            use_words in any::<bool>(),
        ) {
            let text = paragraphs
                .iter()
                .map(|p| p.join(" "))
                .collect::<Vec<_>>()
                .join("\n\n");
            let expected: Vec<String> = split_paragraphs(&text)
                .iter()
                .flat_map(|p| split_sentences(p))
                .collect();

            let pages = synthetic_pages(&[chapter("c", &text)], page_size, use_words);
            let mut rebuilt = Vec::new();
            for page in &pages {
                prop_assert!(!page.text.is_empty());
                let sentences: Vec<String> = split_paragraphs(&page.text)
                    .iter()
                    .flat_map(|p| split_sentences(p))
                    .collect();
                let start = rebuilt.len();
                prop_assert_eq!(&expected[start..start + sentences.len()], &sentences[..]);
                rebuilt.extend(sentences);
            }
            prop_assert_eq!(rebuilt, expected);
        }
    }
}
