//! EPUB fixtures written to disk for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const COVER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Cover</title></head>
<body>
<p>The Lantern Keeper</p>
<p>A novel</p>
</body>
</html>
"#;

pub const CHAPTER_ONE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Chapter One</title></head>
<body>
<h1>Chapter One</h1>
<span epub:type="pagebreak" id="page1"></span>
<p>The lamp was lit at dusk.</p>
<p>Mara climbed the stairs.</p>
<span epub:type="pagebreak" id="page2"></span>
<p>The sea was calm that night.</p>
</body>
</html>
"#;

pub const CHAPTER_TWO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Chapter Two</title></head>
<body>
<h1>Chapter Two</h1>
<span epub:type="pagebreak" id="page3"></span>
<p>Wind rose before dawn.</p>
<h2 id="storm">The Storm</h2>
<p>Rain lashed the glass.</p>
</body>
</html>
"#;

/// How the fixture book is assembled
#[derive(Debug, Clone, Copy, Default)]
pub struct Fixture {
    /// Include a page-list in the navigation document
    pub page_list: bool,

    /// List Chapter Two before Chapter One in the table of contents
    pub reversed_toc: bool,

    /// EPUB 2 with an NCX instead of an EPUB 3 nav document
    pub legacy: bool,

    /// Write NCX labels with HTML entities, which strict XML rejects
    pub entity_labels: bool,
}

impl Fixture {
    pub fn epub3() -> Self {
        Self::default()
    }

    pub fn legacy() -> Self {
        Self {
            legacy: true,
            ..Self::default()
        }
    }

    pub fn with_page_list(mut self) -> Self {
        self.page_list = true;
        self
    }

    pub fn with_reversed_toc(mut self) -> Self {
        self.reversed_toc = true;
        self
    }

    pub fn with_entity_labels(mut self) -> Self {
        self.entity_labels = true;
        self
    }

    fn ncx_label(&self, label: &str) -> String {
        if self.entity_labels {
            format!("{}&nbsp;", label.replace(' ', "&nbsp;"))
        } else {
            label.to_string()
        }
    }

    /// Write the book as `lantern.epub` inside `dir`
    pub fn write(self, dir: &Path) -> PathBuf {
        let path = dir.join("lantern.epub");
        let mut files: Vec<(&str, String)> = vec![
            ("OEBPS/content.opf", self.opf()),
            ("OEBPS/text/cover.xhtml", COVER.to_string()),
            ("OEBPS/text/ch1.xhtml", CHAPTER_ONE.to_string()),
            ("OEBPS/text/ch2.xhtml", CHAPTER_TWO.to_string()),
        ];
        if self.legacy {
            files.push(("OEBPS/toc.ncx", self.ncx()));
        } else {
            files.push(("OEBPS/nav.xhtml", self.nav()));
        }
        write_epub(&path, &files);
        path
    }

    fn toc_entries(&self) -> Vec<(&'static str, &'static str, Vec<(&'static str, &'static str)>)> {
        let one = ("Chapter One", "text/ch1.xhtml", vec![]);
        let two = (
            "Chapter Two",
            "text/ch2.xhtml",
            vec![("The Storm", "text/ch2.xhtml#storm")],
        );
        if self.reversed_toc {
            vec![two, one]
        } else {
            vec![one, two]
        }
    }

    fn pages(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("1", "text/ch1.xhtml#page1"),
            ("2", "text/ch1.xhtml#page2"),
            ("3", "text/ch2.xhtml#page3"),
        ]
    }

    fn opf(&self) -> String {
        let (version, nav_item, spine_attr) = if self.legacy {
            (
                "2.0",
                r#"<item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
                r#" toc="ncx""#,
            )
        } else {
            (
                "3.0",
                r#"<item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#,
                "",
            )
        };

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="{version}" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="bookid">urn:uuid:7d4b1c2e-lantern</dc:identifier>
    <dc:title>The Lantern Keeper</dc:title>
    <dc:creator>Ada Marsh</dc:creator>
    <dc:creator>Tom Reed</dc:creator>
    <dc:publisher>Harbor Press</dc:publisher>
    <dc:date>2021-06-15</dc:date>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    {nav_item}
    <item id="cover" href="text/cover.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="text/ch2.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine{spine_attr}>
    <itemref idref="cover"/>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>
"#
        )
    }

    fn nav(&self) -> String {
        let mut toc = String::new();
        for (title, href, children) in self.toc_entries() {
            toc.push_str(&format!(r#"<li><a href="{href}">{title}</a>"#));
            if !children.is_empty() {
                toc.push_str("<ol>");
                for (title, href) in children {
                    toc.push_str(&format!(r#"<li><a href="{href}">{title}</a></li>"#));
                }
                toc.push_str("</ol>");
            }
            toc.push_str("</li>\n");
        }

        let page_list = if self.page_list {
            let items: String = self
                .pages()
                .into_iter()
                .map(|(label, href)| format!(r#"<li><a href="{href}">{label}</a></li>"#))
                .collect();
            format!(r#"<nav epub:type="page-list" hidden=""><ol>{items}</ol></nav>"#)
        } else {
            String::new()
        };

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body>
<nav epub:type="toc" id="toc"><h1>Contents</h1>
<ol>
{toc}</ol>
</nav>
{page_list}
</body>
</html>
"#
        )
    }

    fn ncx(&self) -> String {
        let mut order = 0;
        let mut nav_map = String::new();
        for (title, href, children) in self.toc_entries() {
            order += 1;
            let title = self.ncx_label(title);
            nav_map.push_str(&format!(
                r#"<navPoint id="np{order}" playOrder="{order}"><navLabel><text>{title}</text></navLabel><content src="{href}"/>"#
            ));
            for (title, href) in children {
                order += 1;
                let title = self.ncx_label(title);
                nav_map.push_str(&format!(
                    r#"<navPoint id="np{order}" playOrder="{order}"><navLabel><text>{title}</text></navLabel><content src="{href}"/></navPoint>"#
                ));
            }
            nav_map.push_str("</navPoint>\n");
        }
        // Folder whose target is missing and which has no children
        nav_map.push_str(
            r#"<navPoint id="np99" playOrder="99"><navLabel><text>Appendices</text></navLabel><content src="text/missing.xhtml"/></navPoint>"#,
        );

        let page_list = if self.page_list {
            let targets: String = self
                .pages()
                .into_iter()
                .map(|(label, href)| {
                    let text = self.ncx_label(label);
                    format!(
                        r#"<pageTarget id="p{label}" type="normal" value="{label}"><navLabel><text>{text}</text></navLabel><content src="{href}"/></pageTarget>"#
                    )
                })
                .collect();
            format!("<pageList>{targets}</pageList>")
        } else {
            String::new()
        };

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
<head><meta name="dtb:uid" content="urn:uuid:7d4b1c2e-lantern"/></head>
<docTitle><text>The Lantern Keeper</text></docTitle>
<navMap>
{nav_map}
</navMap>
{page_list}
</ncx>
"#
        )
    }
}

/// Write an EPUB archive: stored `mimetype` first, then the container file
/// and the given entries
pub fn write_epub(path: &Path, files: &[(&str, String)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
    )
    .unwrap();

    for (name, content) in files {
        zip.start_file(*name, deflated).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
