//! Flatten raw (X)HTML slices into text
//!
//! Slices handed to [`render_text`] are arbitrary cuts through a document, so
//! they may start mid-body and leave elements unclosed; the HTML5 parser
//! recovers from both.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements whose content never reaches the output
const SKIPPED: &[&str] = &[
    "head", "title", "script", "style", "template", "noscript", "sup", "sub",
];

/// Elements followed by a paragraph separator
const BLOCKS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "section",
    "article", "aside", "header", "footer", "figure", "figcaption", "pre", "table",
    "tr", "dt", "dd", "address", "nav", "hr",
];

/// Render markup to text
///
/// Every block element is followed by `paragraph_separator`, ordered list items
/// are prefixed with `"N) "` (honoring the list's `start` attribute) and
/// superscript/subscript footnote markers are dropped with their content.
/// Whitespace inside text nodes is collapsed the way a browser would, except
/// within `pre`.
pub fn render_text(markup: &str, paragraph_separator: &str) -> String {
    let document = Html::parse_document(markup);
    let mut renderer = Renderer {
        out: String::with_capacity(markup.len() / 2),
        separator: paragraph_separator,
    };
    renderer.walk(document.tree.root(), false);
    renderer.out
}

struct Renderer<'a> {
    out: String,
    separator: &'a str,
}

impl Renderer<'_> {
    fn walk(&mut self, node: NodeRef<'_, Node>, in_pre: bool) {
        for child in node.children() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    if in_pre {
                        self.out.push_str(text);
                    } else {
                        self.push_collapsed(text);
                    }
                }
                Node::Element(element) => {
                    let name = element.name();
                    if SKIPPED.contains(&name) {
                        continue;
                    }
                    if name == "br" {
                        self.out.push('\n');
                        continue;
                    }

                    if name == "ol" {
                        let start = element
                            .attr("start")
                            .and_then(|s| s.trim().parse::<i64>().ok())
                            .unwrap_or(1);
                        self.walk_ordered_list(child, start, in_pre);
                    } else {
                        self.walk(child, in_pre || name == "pre");
                    }

                    if BLOCKS.contains(&name) {
                        self.out.push_str(self.separator);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_ordered_list(&mut self, list: NodeRef<'_, Node>, start: i64, in_pre: bool) {
        let mut number = start;
        for child in list.children() {
            match child.value() {
                Node::Element(element) if element.name() == "li" => {
                    self.out.push_str(&format!("{}) ", number));
                    number += 1;
                    self.walk(child, in_pre);
                    self.out.push_str(self.separator);
                }
                Node::Element(element) if SKIPPED.contains(&element.name()) => {}
                Node::Element(_) => self.walk(child, in_pre),
                Node::Text(text) => {
                    let text: &str = text;
                    self.push_collapsed(text);
                }
                _ => {}
            }
        }
    }

    fn push_collapsed(&mut self, text: &str) {
        let mut pending_space = false;
        for c in text.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                pending_space = true;
                continue;
            }
            if pending_space && !self.out.ends_with(|p: char| p.is_whitespace()) {
                self.out.push(' ');
            }
            pending_space = false;
            self.out.push(c);
        }
        if pending_space && !self.out.is_empty() && !self.out.ends_with(|p: char| p.is_whitespace())
        {
            self.out.push(' ');
        }
    }
}
