//! EPUB container access
//!
//! Wraps the `epub` crate and flattens what the extractor needs into an owned,
//! in-memory view: manifest items with their raw bytes, the spine as a list of
//! archive paths, and the Dublin Core metadata fields. Containers can also be
//! assembled directly with [`ContainerBuilder`], which is how the rest of the
//! crate is tested without zip fixtures.

use crate::error::ContainerError;
use std::borrow::Cow;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{info, warn};

/// Media type of EPUB 2 NCX navigation documents
pub const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Broad classification of a manifest item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Content document (XHTML/HTML)
    Document,

    /// Navigation document: the EPUB 3 `nav` item or the EPUB 2 NCX
    Navigation,

    /// Images, stylesheets, fonts and anything else
    Other,
}

/// A single manifest item
#[derive(Debug, Clone)]
pub struct Item {
    /// Manifest id
    pub id: String,

    /// Path of the item inside the archive
    pub name: String,

    /// Declared media type
    pub media_type: String,

    /// Manifest `properties` attribute
    pub properties: Option<String>,

    /// Classification derived from media type, name and properties
    pub kind: ItemKind,

    content: Vec<u8>,
}

impl Item {
    /// Create an item, classifying it from its name, media type and properties
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        media_type: impl Into<String>,
        properties: Option<String>,
        content: Vec<u8>,
    ) -> Self {
        let name = name.into();
        let media_type = media_type.into();
        let kind = classify(&name, &media_type, properties.as_deref());
        Self {
            id: id.into(),
            name,
            media_type,
            properties,
            kind,
            content,
        }
    }

    /// Raw item bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Item content decoded as UTF-8, dropping invalid sequences
    pub fn content_str(&self) -> Cow<'_, str> {
        let bytes = self
            .content
            .strip_prefix(&[0xEF, 0xBB, 0xBF])
            .unwrap_or(&self.content);
        String::from_utf8_lossy(bytes)
    }

    /// Whether the item is an (X)HTML document by file name
    pub fn is_markup(&self) -> bool {
        has_markup_extension(&self.name)
    }

    /// Whether the item is an NCX document
    pub fn is_ncx(&self) -> bool {
        self.media_type == NCX_MEDIA_TYPE || self.name.to_lowercase().ends_with(".ncx")
    }
}

/// Item ids in the order the package document's manifest lists them
fn manifest_order(opf: &str) -> Vec<String> {
    let document = match roxmltree::Document::parse(opf.trim_start()) {
        Ok(document) => document,
        Err(e) => {
            warn!("Could not read manifest order: {}", e);
            return Vec::new();
        }
    };
    let ids = document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "item")
        .filter(|node| {
            node.parent_element()
                .is_some_and(|parent| parent.tag_name().name() == "manifest")
        })
        .filter_map(|node| node.attribute("id"))
        .map(str::to_string)
        .collect();
    ids
}

fn has_markup_extension(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xhtml") || lower.ends_with(".html") || lower.ends_with(".htm")
}

fn classify(name: &str, media_type: &str, properties: Option<&str>) -> ItemKind {
    let is_nav_property = properties
        .map(|p| p.split_whitespace().any(|prop| prop == "nav"))
        .unwrap_or(false);

    if media_type == NCX_MEDIA_TYPE || name.to_lowercase().ends_with(".ncx") || is_nav_property {
        ItemKind::Navigation
    } else if media_type.contains("html") || has_markup_extension(name) {
        ItemKind::Document
    } else {
        ItemKind::Other
    }
}

/// In-memory view of an EPUB container
#[derive(Debug, Clone, Default)]
pub struct Container {
    items: Vec<Item>,
    spine: Vec<String>,
    metadata: Vec<(String, String)>,
}

impl Container {
    /// Open an EPUB file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ContainerError::NotFound(path.display().to_string()));
        }

        let doc = epub::doc::EpubDoc::new(path)
            .map_err(|e| ContainerError::Invalid(format!("{}: {}", path.display(), e)))?;
        let container = Self::from_epub(doc);

        info!(
            "Loaded EPUB {} ({} items, {} spine documents)",
            path.display(),
            container.items.len(),
            container.spine.len()
        );
        Ok(container)
    }

    /// Read an EPUB from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, ContainerError> {
        let doc = epub::doc::EpubDoc::from_reader(reader)
            .map_err(|e| ContainerError::Invalid(e.to_string()))?;
        Ok(Self::from_epub(doc))
    }

    fn from_epub<R: Read + Seek>(mut doc: epub::doc::EpubDoc<R>) -> Self {
        let root_file = doc.root_file.clone();
        let manifest = doc
            .get_resource_str_by_path(&root_file)
            .map(|opf| manifest_order(&opf))
            .unwrap_or_default();

        // Resources come back unordered; restore manifest order, strays last
        let mut ids: Vec<String> = doc.resources.keys().cloned().collect();
        ids.sort_by_cached_key(|id| {
            let position = manifest.iter().position(|m| m == id).unwrap_or(usize::MAX);
            let path = doc.resources.get(id).map(|r| r.path.clone());
            (position, path)
        });

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(resource) = doc.resources.get(&id).cloned() else {
                continue;
            };
            let name = archive_path(&resource.path);
            let kind = classify(&name, &resource.mime, resource.properties.as_deref());

            // Only text items are needed for extraction
            let content = if kind == ItemKind::Other {
                Vec::new()
            } else {
                doc.get_resource(&id).map(|(data, _)| data).unwrap_or_default()
            };

            items.push(Item::new(id, name, resource.mime, resource.properties, content));
        }

        let mut spine = Vec::with_capacity(doc.spine.len());
        for spine_item in &doc.spine {
            match doc.resources.get(&spine_item.idref) {
                Some(resource) => spine.push(archive_path(&resource.path)),
                None => warn!("Spine item with id '{}' not found", spine_item.idref),
            }
        }

        let metadata = doc
            .metadata
            .iter()
            .map(|item| (item.property.clone(), item.value.clone()))
            .collect();

        Self {
            items,
            spine,
            metadata,
        }
    }

    /// Start building a container in memory
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// All manifest items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items of a given kind, in container order
    pub fn items_of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    /// Look up an item by archive path
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// Spine document paths in reading order
    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    /// All values of a Dublin Core field, in document order
    pub fn metadata(&self, field: &str) -> Vec<&str> {
        self.metadata
            .iter()
            .filter(|(key, _)| key == field)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

fn archive_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Builder for in-memory containers
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    /// Add a content document and append it to the spine
    pub fn document(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        self.container.spine.push(name.clone());
        self.resource(name, "application/xhtml+xml", content)
    }

    /// Add an EPUB 3 navigation document (not part of the spine)
    pub fn nav(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let id = format!("item{}", self.container.items.len());
        self.container.items.push(Item::new(
            id,
            name,
            "application/xhtml+xml",
            Some("nav".to_string()),
            content.into().into_bytes(),
        ));
        self
    }

    /// Add an EPUB 2 NCX document
    pub fn ncx(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.resource(name, NCX_MEDIA_TYPE, content)
    }

    /// Add an item that is not part of the spine
    pub fn resource(
        mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let id = format!("item{}", self.container.items.len());
        self.container.items.push(Item::new(
            id,
            name,
            media_type,
            None,
            content.into().into_bytes(),
        ));
        self
    }

    /// Add a Dublin Core metadata value
    pub fn metadata(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.container.metadata.push((field.into(), value.into()));
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_items() {
        assert_eq!(
            classify("OEBPS/toc.ncx", NCX_MEDIA_TYPE, None),
            ItemKind::Navigation
        );
        assert_eq!(
            classify("OEBPS/nav.xhtml", "application/xhtml+xml", Some("nav scripted")),
            ItemKind::Navigation
        );
        assert_eq!(
            classify("OEBPS/ch1.xhtml", "application/xhtml+xml", None),
            ItemKind::Document
        );
        assert_eq!(classify("OEBPS/cover.jpg", "image/jpeg", None), ItemKind::Other);
    }

    #[test]
    fn test_builder_spine_and_metadata() {
        let container = Container::builder()
            .nav("nav.xhtml", "<nav/>")
            .document("ch1.xhtml", "<p>One</p>")
            .document("ch2.xhtml", "<p>Two</p>")
            .metadata("creator", "A. Author")
            .metadata("creator", "B. Author")
            .build();

        assert_eq!(container.spine(), ["ch1.xhtml", "ch2.xhtml"]);
        assert_eq!(container.items_of_kind(ItemKind::Navigation).count(), 1);
        assert_eq!(container.items_of_kind(ItemKind::Document).count(), 2);
        assert_eq!(container.metadata("creator"), vec!["A. Author", "B. Author"]);
        assert!(container.metadata("title").is_empty());
    }

    #[test]
    fn test_manifest_order() {
        let opf = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata/>
  <manifest>
    <item id="zeta" href="z/nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="alpha" href="a/nav.xhtml" media-type="application/xhtml+xml"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
  </manifest>
  <spine toc="ncx"><itemref idref="alpha"/></spine>
</package>"#;
        assert_eq!(manifest_order(opf), vec!["zeta", "alpha", "ncx"]);
        assert!(manifest_order("<package><manifest>").is_empty());
    }

    #[test]
    fn test_content_str_strips_bom() {
        let item = Item::new(
            "id",
            "a.xhtml",
            "application/xhtml+xml",
            None,
            b"\xEF\xBB\xBF<p>x</p>".to_vec(),
        );
        assert_eq!(item.content_str(), "<p>x</p>");
    }

    #[test]
    fn test_open_missing_file() {
        let err = Container::open("/nonexistent/book.epub").unwrap_err();
        assert!(matches!(err, ContainerError::NotFound(_)));
    }
}
