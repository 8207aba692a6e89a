//! EPUB 2 NCX navigation documents
//!
//! NCX files are parsed as XML first. Real-world files often carry HTML
//! named entities (`&nbsp;`, `&mdash;`) or broken nesting that strict XML
//! rejects; those are re-read with the HTML parser, which decodes entities
//! and recovers structure.

use super::{PageTarget, UNTITLED_SECTION};
use crate::error::NavigationError;
use crate::types::NavEntry;
use roxmltree::{Document, Node, ParsingOptions};
use tracing::warn;

fn parse_document<'a>(content: &'a str, name: &str) -> Result<Document<'a>, NavigationError> {
    // NCX files commonly carry a DOCTYPE
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(content.trim_start(), options).map_err(|e| {
        NavigationError::Malformed {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Parse the `navMap` into an entry tree
pub fn parse_nav_map(content: &str, name: &str) -> Result<Vec<NavEntry>, NavigationError> {
    let document = match parse_document(content, name) {
        Ok(document) => document,
        Err(err) => {
            let entries = lenient::nav_map(content);
            if entries.is_empty() {
                return Err(err);
            }
            warn!("{}, recovered {} entries", err, entries.len());
            return Ok(entries);
        }
    };

    let Some(nav_map) = document
        .descendants()
        .find(|node| is_named(node, "navMap"))
    else {
        warn!("Could not find <navMap> in {}", name);
        return Ok(Vec::new());
    };

    Ok(child_elements(nav_map, "navPoint")
        .map(parse_nav_point)
        .collect())
}

/// Parse the `pageList` into page targets
///
/// `None` when the NCX has no `pageList`.
pub fn parse_page_list(
    content: &str,
    name: &str,
) -> Result<Option<Vec<PageTarget>>, NavigationError> {
    let document = match parse_document(content, name) {
        Ok(document) => document,
        Err(err) => {
            let Some(targets) = lenient::page_list(content) else {
                return Err(err);
            };
            warn!("{}, recovered {} page targets", err, targets.len());
            return Ok(Some(targets));
        }
    };

    let Some(page_list) = document
        .descendants()
        .find(|node| is_named(node, "pageList"))
    else {
        return Ok(None);
    };

    let targets = page_list
        .descendants()
        .filter(|node| is_named(node, "pageTarget"))
        .filter_map(|target| {
            let label = label_text(target)?;
            let src = content_src(target)?;
            (!label.is_empty()).then_some(PageTarget { label, src })
        })
        .collect();
    Ok(Some(targets))
}

fn parse_nav_point(node: Node<'_, '_>) -> NavEntry {
    let title = label_text(node).unwrap_or_else(|| UNTITLED_SECTION.to_string());
    let mut entry = NavEntry::new(title, content_src(node));
    for child in child_elements(node, "navPoint") {
        entry.add_child(parse_nav_point(child));
    }
    entry
}

/// Text of the direct `navLabel/text` child
fn label_text(node: Node<'_, '_>) -> Option<String> {
    let label = child_elements(node, "navLabel").next()?;
    let text = child_elements(label, "text").next()?;
    let raw: String = text
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    Some(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// `src` of the direct `content` child
fn content_src(node: Node<'_, '_>) -> Option<String> {
    child_elements(node, "content")
        .next()
        .and_then(|content| content.attribute("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| is_named(child, name))
}

/// Match on local name so both namespaced and bare NCX files work
fn is_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// HTML parser fallback for NCX files that are not well-formed XML
///
/// Element names come back lowercased, and a self-closed `<content/>` stays
/// open until its parent closes, so nested points can end up inside it.
/// Ownership is therefore decided by the nearest enclosing `navPoint` (or
/// `pageTarget`/list root) rather than by direct parenthood.
mod lenient {
    use super::super::{PageTarget, UNTITLED_SECTION};
    use crate::types::NavEntry;
    use scraper::{ElementRef, Html};

    const OWNERS: &[&str] = &["navmap", "navpoint", "pagelist", "pagetarget"];

    pub fn nav_map(content: &str) -> Vec<NavEntry> {
        let document = Html::parse_document(content);
        let Some(nav_map) = named(document.root_element(), "navmap").next() else {
            return Vec::new();
        };
        let entries = owned(nav_map, "navpoint").map(nav_point).collect();
        entries
    }

    pub fn page_list(content: &str) -> Option<Vec<PageTarget>> {
        let document = Html::parse_document(content);
        let page_list = named(document.root_element(), "pagelist").next()?;
        let targets = named(page_list, "pagetarget")
            .filter_map(|target| {
                let label = label_text(target)?;
                let src = content_src(target)?;
                (!label.is_empty()).then_some(PageTarget { label, src })
            })
            .collect();
        Some(targets)
    }

    fn nav_point(point: ElementRef<'_>) -> NavEntry {
        let title = label_text(point).unwrap_or_else(|| UNTITLED_SECTION.to_string());
        let mut entry = NavEntry::new(title, content_src(point));
        for child in owned(point, "navpoint") {
            entry.add_child(nav_point(child));
        }
        entry
    }

    fn label_text(owner: ElementRef<'_>) -> Option<String> {
        let label = owned(owner, "navlabel").next()?;
        let text = named(label, "text").next()?;
        let raw: String = text.text().collect();
        Some(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn content_src(owner: ElementRef<'_>) -> Option<String> {
        owned(owner, "content")
            .find_map(|content| content.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
    }

    fn named<'a>(
        element: ElementRef<'a>,
        name: &'static str,
    ) -> impl Iterator<Item = ElementRef<'a>> {
        element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(move |el| el.value().name().eq_ignore_ascii_case(name))
    }

    /// Descendants named `name` whose nearest owning element is `owner`
    fn owned<'a>(
        owner: ElementRef<'a>,
        name: &'static str,
    ) -> impl Iterator<Item = ElementRef<'a>> {
        named(owner, name).filter(move |el| nearest_owner(*el) == Some(owner))
    }

    fn nearest_owner(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| {
                OWNERS
                    .iter()
                    .any(|owner| ancestor.value().name().eq_ignore_ascii_case(owner))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="id"/></head>
  <docTitle><text>Book</text></docTitle>
  <navMap>
    <navPoint id="n1" playOrder="1">
      <navLabel><text>Chapter 1</text></navLabel>
      <content src="ch1.xhtml"/>
      <navPoint id="n1a" playOrder="2">
        <navLabel><text>Scene  A</text></navLabel>
        <content src="ch1.xhtml#a"/>
      </navPoint>
    </navPoint>
    <navPoint id="n2" playOrder="3">
      <navLabel><text>Part Two</text></navLabel>
    </navPoint>
  </navMap>
  <pageList>
    <pageTarget id="p1" type="front" value="1">
      <navLabel><text>xi</text></navLabel>
      <content src="ch1.xhtml#pxi"/>
    </pageTarget>
    <pageTarget id="p2" type="normal" value="2">
      <navLabel><text>1</text></navLabel>
      <content src="ch1.xhtml#p1"/>
    </pageTarget>
    <pageTarget id="p3" type="normal" value="3">
      <navLabel><text>2</text></navLabel>
    </pageTarget>
  </pageList>
</ncx>"#;

    #[test]
    fn test_parse_nav_map() {
        let entries = parse_nav_map(NCX, "toc.ncx").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Chapter 1");
        assert_eq!(entries[0].src.as_deref(), Some("ch1.xhtml"));
        assert_eq!(entries[0].children[0].title, "Scene A");
        assert_eq!(entries[0].children[0].src.as_deref(), Some("ch1.xhtml#a"));
        assert_eq!(entries[1].title, "Part Two");
        assert_eq!(entries[1].src, None);
    }

    #[test]
    fn test_parse_page_list() {
        let targets = parse_page_list(NCX, "toc.ncx").unwrap().unwrap();
        let labels: Vec<&str> = targets.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["xi", "1"]);
        assert_eq!(targets[0].src, "ch1.xhtml#pxi");
    }

    #[test]
    fn test_missing_sections() {
        let bare = r#"<ncx><docTitle><text>x</text></docTitle></ncx>"#;
        assert!(parse_nav_map(bare, "toc.ncx").unwrap().is_empty());
        assert!(parse_page_list(bare, "toc.ncx").unwrap().is_none());
    }

    #[test]
    fn test_html_entities_in_labels() {
        let ncx = r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/"><navMap>
            <navPoint id="n1"><navLabel><text>Chapter&nbsp;One</text></navLabel><content src="a.xhtml"/>
                <navPoint id="n1a"><navLabel><text>Dawn &mdash; Dusk</text></navLabel><content src="a.xhtml#d"/></navPoint>
            </navPoint>
            <navPoint id="n2"><navLabel><text>Two</text></navLabel><content src="b.xhtml"/></navPoint>
        </navMap>
        <pageList><pageTarget id="p1"><navLabel><text>i&nbsp;</text></navLabel><content src="a.xhtml#pi"/></pageTarget></pageList>
        </ncx>"#;

        let entries = parse_nav_map(ncx, "toc.ncx").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Chapter One");
        assert_eq!(entries[0].src.as_deref(), Some("a.xhtml"));
        assert_eq!(entries[0].children.len(), 1);
        assert_eq!(entries[0].children[0].title, "Dawn \u{2014} Dusk");
        assert_eq!(entries[0].children[0].src.as_deref(), Some("a.xhtml#d"));
        assert_eq!(entries[1].title, "Two");
        assert!(entries[1].children.is_empty());

        let targets = parse_page_list(ncx, "toc.ncx").unwrap().unwrap();
        assert_eq!(
            targets,
            vec![PageTarget {
                label: "i".to_string(),
                src: "a.xhtml#pi".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_ncx() {
        let err = parse_nav_map("<ncx><navMap>", "broken.ncx").unwrap_err();
        assert!(matches!(err, NavigationError::Malformed { ref name, .. } if name == "broken.ncx"));
    }
}
