//! Anchor position lookup inside raw markup
//!
//! The HTML parser does not report source offsets, so the offset of an
//! element is recovered by searching the raw markup, falling back to ever
//! looser textual matches. A miss is never an error: the anchor degrades to
//! the start of the document.

use regex::RegexBuilder;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// Length of the serialized element prefix searched for in the raw markup
const TAG_PREFIX_CHARS: usize = 200;

/// Byte offset of the element carrying `fragment` as its `id` (or `name`)
///
/// Returns 0 when there is no fragment or it cannot be found. The result is
/// always a char boundary within `markup`.
pub fn locate(markup: &str, fragment: Option<&str>) -> usize {
    let Some(fragment) = fragment.filter(|f| !f.is_empty()) else {
        return 0;
    };

    if let Some(pos) = locate_structural(markup, fragment) {
        debug!("Found position for id='{}': {}", fragment, pos);
        return pos;
    }
    if let Some(pos) = locate_attribute_pattern(markup, fragment) {
        debug!("Found position for id/name='{}' (pattern): {}", fragment, pos);
        return pos;
    }
    if let Some(pos) = locate_literal(markup, fragment) {
        debug!("Found position for id/name='{}' (literal): {}", fragment, pos);
        return pos;
    }

    warn!("Anchor '{}' not found, using start of document", fragment);
    0
}

/// Serialize the element with the given id and search for its opening text
fn locate_structural(markup: &str, fragment: &str) -> Option<usize> {
    let document = Html::parse_document(markup);
    let element = document
        .tree
        .nodes()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(fragment))?;

    let serialized = element.html();
    let prefix_end = serialized
        .char_indices()
        .nth(TAG_PREFIX_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(serialized.len());
    markup.find(&serialized[..prefix_end])
}

/// Start of the first tag with a matching `id`/`name` attribute, ignoring case
fn locate_attribute_pattern(markup: &str, fragment: &str) -> Option<usize> {
    let pattern = format!(
        r#"<[^>]+(?:id|name)\s*=\s*["']{}["']"#,
        regex::escape(fragment)
    );
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    re.find(markup).map(|m| m.start())
}

/// Earliest literal `id="..."` or `name="..."`, moved back to its tag start
fn locate_literal(markup: &str, fragment: &str) -> Option<usize> {
    let id_pos = markup.find(&format!("id=\"{}\"", fragment));
    let name_pos = markup.find(&format!("name=\"{}\"", fragment));

    let pos = match (id_pos, name_pos) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    Some(markup[..pos].rfind('<').unwrap_or(0))
}
