//! Navigation document discovery, parsing and global ordering
//!
//! Two schema families are supported: the EPUB 3 XHTML `nav` document
//! ([`markup`]) and the EPUB 2 NCX ([`legacy`]). Exactly one document is
//! chosen per container; both parsers produce the same [`NavEntry`] tree,
//! which is then resolved against the spine into [`OrderedAnchor`]s sorted in
//! reading order.

pub mod legacy;
pub mod markup;

use crate::container::{Container, Item, ItemKind};
use crate::error::NavigationError;
use crate::locator::locate;
use crate::slicer::SpineContent;
use crate::types::{NavEntry, OrderedAnchor};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Title used for entries without any label text
pub const UNTITLED_SECTION: &str = "Untitled Section";

static PAGE_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)epub:type\s*=\s*['"]page-list['"]"#).unwrap());

/// Schema family of a navigation document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSchema {
    /// EPUB 3 XHTML `nav`
    Markup,

    /// EPUB 2 NCX
    Legacy,
}

/// The authoritative navigation document of a container
#[derive(Debug, Clone)]
pub struct NavDocument {
    pub name: String,
    pub schema: NavSchema,
    content: String,
}

impl NavDocument {
    /// Pick the navigation document, first match wins:
    /// a nav-typed markup item named like `nav`, any nav-typed markup item,
    /// the NCX, then any document embedding a `toc` nav.
    pub fn resolve(container: &Container) -> Result<Self, NavigationError> {
        let nav_items: Vec<&Item> = container.items_of_kind(ItemKind::Navigation).collect();

        let preferred = nav_items
            .iter()
            .find(|item| item.is_markup() && item.name.to_lowercase().contains("nav"))
            .or_else(|| nav_items.iter().find(|item| item.is_markup()));
        if let Some(item) = preferred {
            info!("Using navigation document {}", item.name);
            return Ok(Self::from_item(item, NavSchema::Markup));
        }

        if let Some(item) = nav_items.iter().find(|item| item.is_ncx()) {
            info!("Using NCX navigation {}", item.name);
            return Ok(Self::from_item(item, NavSchema::Legacy));
        }

        if let Some(document) = Self::embedded(container) {
            return Ok(document);
        }

        warn!("No navigation document found");
        Err(NavigationError::NotFound)
    }

    /// First content document embedding a `toc` nav
    pub fn embedded(container: &Container) -> Option<Self> {
        let item = container.items_of_kind(ItemKind::Document).find(|item| {
            let content = item.content_str();
            content.contains("<nav")
                && content.contains(r#"epub:type="toc""#)
                && markup::has_toc_nav(&content)
        })?;
        info!("Using navigation embedded in {}", item.name);
        Some(Self::from_item(item, NavSchema::Markup))
    }

    fn from_item(item: &Item, schema: NavSchema) -> Self {
        Self {
            name: item.name.clone(),
            schema,
            content: item.content_str().into_owned(),
        }
    }

    /// Build a navigation document from raw content
    pub fn new(name: impl Into<String>, schema: NavSchema, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            content: content.into(),
        }
    }

    /// Parse the unresolved entry tree
    pub fn entries(&self) -> Result<Vec<NavEntry>, NavigationError> {
        match self.schema {
            NavSchema::Markup => Ok(markup::parse_toc(&self.content)),
            NavSchema::Legacy => legacy::parse_nav_map(&self.content, &self.name),
        }
    }
}

/// Resolved navigation: display tree plus anchors in reading order
#[derive(Debug, Clone)]
pub struct Navigation {
    /// Name of the navigation document used
    pub document: String,

    pub schema: NavSchema,

    /// Entry tree in navigation order, `has_content` set for resolved entries
    pub tree: Vec<NavEntry>,

    /// Resolved entries sorted by `(doc_order, position)`
    pub anchors: Vec<OrderedAnchor>,
}

impl Navigation {
    /// Discover, parse and order the container's navigation
    ///
    /// An NCX that cannot be read even leniently gives way to a content
    /// document with an embedded `toc` nav, when there is one.
    pub fn load(container: &Container, content: &SpineContent) -> Result<Self, NavigationError> {
        let document = NavDocument::resolve(container)?;
        match Self::from_document(&document, content) {
            Err(err @ NavigationError::Malformed { .. }) if document.schema == NavSchema::Legacy => {
                let Some(embedded) = NavDocument::embedded(container) else {
                    return Err(err);
                };
                warn!("{}, falling back to {}", err, embedded.name);
                Self::from_document(&embedded, content)
            }
            result => result,
        }
    }

    /// Parse and order a specific navigation document
    ///
    /// Fails with [`NavigationError::NoValidEntries`] when no entry resolves
    /// to a spine document.
    pub fn from_document(
        document: &NavDocument,
        content: &SpineContent,
    ) -> Result<Self, NavigationError> {
        let entries = document.entries()?;
        let resolver = HrefResolver::new(&document.name, content.spine());

        let mut anchors = Vec::new();
        let tree = resolve_entries(entries, document.schema, &resolver, content, &mut anchors);

        if anchors.is_empty() {
            warn!("No valid navigation entries found in {}", document.name);
            return Err(NavigationError::NoValidEntries(document.name.clone()));
        }

        anchors.sort_by_key(OrderedAnchor::sort_key);
        info!(
            "Ordered {} of {} navigation entries from {}",
            anchors.len(),
            tree.iter().map(NavEntry::entry_count).sum::<usize>(),
            document.name
        );

        Ok(Self {
            document: document.name.clone(),
            schema: document.schema,
            tree,
            anchors,
        })
    }
}

fn resolve_entries(
    entries: Vec<NavEntry>,
    schema: NavSchema,
    resolver: &HrefResolver<'_>,
    content: &SpineContent,
    anchors: &mut Vec<OrderedAnchor>,
) -> Vec<NavEntry> {
    let mut kept = Vec::with_capacity(entries.len());

    for mut entry in entries {
        if let Some(src) = entry.src.as_deref() {
            match resolve_anchor(resolver, content, src, &entry.title) {
                Some(anchor) => {
                    anchors.push(anchor);
                    entry.has_content = true;
                }
                None => warn!(
                    "Entry '{}' points to '{}' which is not in the spine",
                    entry.title, src
                ),
            }
        }

        let children = std::mem::take(&mut entry.children);
        entry.children = resolve_entries(children, schema, resolver, content, anchors);

        // Empty NCX folders are dropped; markup entries are always kept
        let keep = match schema {
            NavSchema::Markup => true,
            NavSchema::Legacy => {
                !entry.title.is_empty() && (entry.has_content || !entry.children.is_empty())
            }
        };
        if keep {
            kept.push(entry);
        }
    }
    kept
}

/// Resolve a `document#fragment` link to a spine position
pub fn resolve_anchor(
    resolver: &HrefResolver<'_>,
    content: &SpineContent,
    src: &str,
    title: &str,
) -> Option<OrderedAnchor> {
    let (path, fragment) = split_src(src);
    let (doc_href, doc_order) = resolver.resolve(path)?;
    let position = locate(content.document(doc_href), fragment);
    debug!("Anchor '{}' at {}:{}", src, doc_href, position);

    Some(OrderedAnchor {
        src: src.to_string(),
        title: title.to_string(),
        doc_href: doc_href.to_string(),
        position,
        doc_order,
    })
}

/// Split a link into its path and optional fragment
pub fn split_src(src: &str) -> (&str, Option<&str>) {
    match src.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment).filter(|f| !f.is_empty())),
        None => (src, None),
    }
}

/// Matches navigation links against spine document names
#[derive(Debug, Clone)]
pub struct HrefResolver<'a> {
    document: String,
    base_dir: String,
    spine: &'a [String],
}

impl<'a> HrefResolver<'a> {
    /// Resolver for links written in the document `relative_to`
    pub fn new(relative_to: &str, spine: &'a [String]) -> Self {
        let base_dir = relative_to
            .rsplit_once('/')
            .map(|(dir, _)| dir.to_string())
            .unwrap_or_default();
        Self {
            document: relative_to.to_string(),
            base_dir,
            spine,
        }
    }

    /// Spine name and index for a link path
    ///
    /// Tries the path resolved against the linking document, then the path as
    /// written, each raw and percent-decoded, and finally a case-insensitive
    /// basename match.
    pub fn resolve(&self, path: &str) -> Option<(&'a str, usize)> {
        let joined = if path.is_empty() {
            self.document.clone()
        } else {
            join_path(&self.base_dir, path)
        };
        let candidates = [joined.clone(), decode(&joined), path.to_string(), decode(path)];

        for candidate in &candidates {
            if let Some(found) = self.find(|name| name == candidate.as_str()) {
                return Some(found);
            }
            if let Some(found) = self.find(|name| decode(name) == *candidate) {
                return Some(found);
            }
        }

        let wanted = basename(&decode(&joined)).to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.find(|name| basename(&decode(name)).to_lowercase() == wanted)
    }

    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<(&'a str, usize)> {
        let spine: &'a [String] = self.spine;
        spine
            .iter()
            .enumerate()
            .find(|(_, name)| matches(name.as_str()))
            .map(|(index, name)| (name.as_str(), index))
    }
}

fn decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().into_owned()
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Join a relative link onto a directory, normalizing `.` and `..`
fn join_path(base_dir: &str, href: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let (base, href) = match href.strip_prefix('/') {
        Some(rooted) => ("", rooted),
        None => (base_dir, href),
    };

    for segment in base.split('/').chain(href.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// A page-list navigation structure and its targets
#[derive(Debug, Clone)]
pub struct PageList {
    /// Document the page-list was found in
    pub document: String,

    /// Page targets in navigation order, never empty
    pub targets: Vec<PageTarget>,
}

/// One page-list entry: the literal page label and its link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub label: String,
    pub src: String,
}

/// Find the container's page-list, if any
///
/// Looks at navigation markup documents, then the NCX `pageList`, then any
/// content document with an embedded page-list `nav`. Lists without entries
/// are skipped.
pub fn find_page_list(container: &Container) -> Option<PageList> {
    let nav_items: Vec<&Item> = container.items_of_kind(ItemKind::Navigation).collect();

    for item in nav_items.iter().filter(|item| item.is_markup()) {
        if let Some(list) = markup_page_list(item) {
            return Some(list);
        }
    }

    let ncx = nav_items
        .iter()
        .copied()
        .find(|item| item.is_ncx())
        .or_else(|| container.items().iter().find(|item| item.is_ncx()));
    if let Some(item) = ncx {
        match legacy::parse_page_list(&item.content_str(), &item.name) {
            Ok(Some(targets)) if !targets.is_empty() => {
                info!("Found pageList in NCX {}", item.name);
                return Some(PageList {
                    document: item.name.clone(),
                    targets,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("Ignoring page list: {}", e),
        }
    }

    container
        .items_of_kind(ItemKind::Document)
        .find_map(markup_page_list)
}

fn markup_page_list(item: &Item) -> Option<PageList> {
    let content = item.content_str();
    if !PAGE_LIST_RE.is_match(&content) {
        return None;
    }
    let targets = markup::parse_page_list(&content).filter(|targets| !targets.is_empty())?;
    info!("Found page-list in {}", item.name);
    Some(PageList {
        document: item.name.clone(),
        targets,
    })
}
