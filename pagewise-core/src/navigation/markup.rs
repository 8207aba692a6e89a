//! EPUB 3 XHTML navigation documents

use super::{PageTarget, UNTITLED_SECTION};
use crate::types::NavEntry;
use scraper::{ElementRef, Html, Node};
use tracing::warn;

/// Parse the `toc` nav into an entry tree
///
/// Falls back to the first `nav` containing an `ol` when no nav is typed
/// `toc`. Returns no entries when neither exists.
pub fn parse_toc(content: &str) -> Vec<NavEntry> {
    let document = Html::parse_document(content);

    let Some(nav) = find_toc_nav(&document) else {
        warn!("Could not find a table of contents <nav>");
        return Vec::new();
    };
    let Some(top) = child_elements(nav, "ol").next() else {
        warn!("Found <nav> but no top-level <ol>");
        return Vec::new();
    };

    child_elements(top, "li").map(parse_item).collect()
}

/// Whether the markup contains a `nav` typed `toc`
pub fn has_toc_nav(content: &str) -> bool {
    let document = Html::parse_document(content);
    let found = navs(&document).any(|nav| has_epub_type(nav, "toc"));
    found
}

/// Parse a `page-list` nav into page targets
///
/// `None` when the markup has no page-list nav at all.
pub fn parse_page_list(content: &str) -> Option<Vec<PageTarget>> {
    let document = Html::parse_document(content);
    let nav = navs(&document).find(|nav| has_epub_type(*nav, "page-list"))?;

    let Some(list) = nav
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "ol")
    else {
        return Some(Vec::new());
    };

    let targets = child_elements(list, "li")
        .filter_map(|li| {
            let link = li
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "a")?;
            let href = link.value().attr("href")?;
            Some(PageTarget {
                label: element_text(link),
                src: href.to_string(),
            })
        })
        .collect();
    Some(targets)
}

fn navs(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "nav")
}

fn find_toc_nav(document: &Html) -> Option<ElementRef<'_>> {
    navs(document).find(|nav| has_epub_type(*nav, "toc")).or_else(|| {
        navs(document).find(|nav| {
            nav.descendants()
                .filter_map(ElementRef::wrap)
                .any(|el| el.value().name() == "ol")
        })
    })
}

/// html5ever keeps `epub:type` as a literal attribute name
fn has_epub_type(element: ElementRef<'_>, wanted: &str) -> bool {
    element
        .value()
        .attr("epub:type")
        .map(|value| value.split_whitespace().any(|t| t.eq_ignore_ascii_case(wanted)))
        .unwrap_or(false)
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

/// Text nodes directly inside the element
fn own_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    collapse(&text)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn parse_item(li: ElementRef<'_>) -> NavEntry {
    let span_title = || child_elements(li, "span").next().map(element_text).and_then(non_empty);
    let own_title = || non_empty(own_text(li));

    let link = child_elements(li, "a")
        .next()
        .and_then(|a| a.value().attr("href").map(|href| (a, href)));

    let (src, title) = match link {
        Some((a, href)) => (
            Some(href.to_string()),
            non_empty(element_text(a)).or_else(span_title).or_else(own_title),
        ),
        None => (None, span_title().or_else(own_title)),
    };

    let mut entry = NavEntry::new(title.unwrap_or_else(|| UNTITLED_SECTION.to_string()), src);
    for list in child_elements(li, "ol") {
        for child in child_elements(list, "li") {
            entry.add_child(parse_item(child));
        }
    }
    entry
}
