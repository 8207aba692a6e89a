//! Heuristics applied when assembling output text: duplicate title removal
//! and table of contents detection/stripping

use regex::RegexBuilder;
use std::collections::BTreeSet;

/// Chapter titles that mark front matter
pub const FRONT_MATTER_TITLES: &[&str] = &[
    "INTRODUCTION",
    "TABLE OF CONTENTS",
    "CONTENTS",
    "TOC",
    "ACKNOWLEDGEMENTS",
    "ACKNOWLEDGMENTS",
    "FOREWORD",
    "PREFACE",
];

const HEADING_WORDS: &[&str] = &["chapter", "part", "book", "section", "act"];

/// Only the start of a text is scanned for a title listing
const TOC_SCAN_CHARS: usize = 2000;

/// Standalone title lines needed to call a text a table of contents
const TOC_MIN_MATCHES: usize = 3;

/// Title lines needed before a run is stripped
const STRIP_MIN_ENTRIES: usize = 5;

/// Maximum average line distance between stripped title lines
const STRIP_MAX_DENSITY: f64 = 3.0;

/// Titles longer than this are not treated as listing entries
const STRIP_MAX_TITLE_CHARS: usize = 30;

/// Headings longer than this are never deduplicated by normalized match
const HEADING_MAX_CHARS: usize = 120;

/// Upper-cased book and chapter titles, used to spot title listings
#[derive(Debug, Clone, Default)]
pub struct KnownTitles {
    titles: BTreeSet<String>,
}

impl KnownTitles {
    pub fn new<'a>(
        book_title: Option<&'a str>,
        chapter_titles: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let titles = book_title
            .into_iter()
            .chain(chapter_titles)
            .map(|title| title.trim().to_uppercase())
            .filter(|title| !title.is_empty())
            .collect();
        Self { titles }
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    fn contains(&self, upper: &str) -> bool {
        self.titles.contains(upper)
    }

    /// Byte offset in `line` where the longest short title starting it ends,
    /// when a space follows
    fn leading_title_end(&self, line: &str) -> Option<usize> {
        self.titles
            .iter()
            .filter(|title| title.chars().count() < STRIP_MAX_TITLE_CHARS)
            .filter_map(|title| caseless_prefix_len(line, title))
            .filter(|&end| line[end..].starts_with(' '))
            .max()
    }
}

/// Byte length of the prefix of `line` that reads `upper` once upper-cased
///
/// Works per source char, so expanding mappings (`ß` to `SS`) still cut the
/// original text at a char boundary.
fn caseless_prefix_len(line: &str, upper: &str) -> Option<usize> {
    if upper.is_empty() {
        return Some(0);
    }
    let mut wanted = upper.chars();
    for (i, c) in line.char_indices() {
        for u in c.to_uppercase() {
            if wanted.next() != Some(u) {
                return None;
            }
        }
        if wanted.as_str().is_empty() {
            return Some(i + c.len_utf8());
        }
    }
    None
}

/// Whether a chapter title is a front matter keyword
pub fn is_front_matter_title(title: &str) -> bool {
    FRONT_MATTER_TITLES.contains(&title.trim().to_uppercase().as_str())
}

/// Remove the title from the start of `text` when the first line repeats it
///
/// Matching gets progressively looser: the exact line, any case, the title
/// followed by a space or separator punctuation, and finally a comparison of
/// the alphanumeric characters of short heading-like lines.
pub fn remove_duplicate_title(text: &str, title: &str) -> String {
    let title = title.trim();
    if text.is_empty() || title.is_empty() {
        return text.to_string();
    }

    let (first_raw, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };
    let first = first_raw.trim();
    let drop_line = || rest.unwrap_or("").to_string();
    let join_remainder = |remainder: &str| {
        let remainder = remainder.trim_start();
        match rest {
            Some(rest) if !remainder.is_empty() => format!("{}\n{}", remainder, rest),
            Some(rest) => rest.to_string(),
            None => remainder.to_string(),
        }
    };

    if first == title || first.to_lowercase() == title.to_lowercase() {
        return drop_line();
    }

    // Title then a space, in any case
    if let Some(end) = caseless_prefix_len(first, &title.to_uppercase()) {
        if first[end..].starts_with(' ') {
            return join_remainder(&first[end..]);
        }
    }

    // Title then separator punctuation ("ONE: The morning...")
    let separated = RegexBuilder::new(&format!(
        r"^{}[\s:\-.,\u{{2013}}\u{{2014}}]+(.+)$",
        regex::escape(title)
    ))
    .case_insensitive(true)
    .build()
    .ok()
    .and_then(|re| re.captures(first).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()));
    if let Some(remainder) = separated {
        return join_remainder(&remainder);
    }

    let normalized_title = normalize(title);
    let normalized_first = normalize(first);
    if normalized_title.is_empty() || normalized_first.is_empty() {
        return text.to_string();
    }
    if normalized_first == normalized_title {
        return drop_line();
    }

    let heading_like = first.chars().count() < HEADING_MAX_CHARS
        && !first.ends_with(['.', '!', '?']);
    if heading_like && normalized_first.starts_with(&normalized_title) {
        let lower = first.to_lowercase();
        if normalized_title.len() >= 3 || HEADING_WORDS.iter().any(|w| lower.starts_with(w)) {
            return drop_line();
        }
    }

    text.to_string()
}

/// Lower-case ASCII alphanumerics only
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Whether text looks like a table of contents or front matter
///
/// True for front matter titles, or when enough standalone lines near the
/// start of the text are known titles.
pub fn is_toc_or_front_matter(text: &str, title: Option<&str>, known: &KnownTitles) -> bool {
    if text.is_empty() {
        return false;
    }
    if title.map(is_front_matter_title).unwrap_or(false) {
        return true;
    }
    if known.is_empty() {
        return false;
    }

    let head: String = text.chars().take(TOC_SCAN_CHARS).collect::<String>().to_uppercase();
    let matches = head
        .lines()
        .filter(|line| known.contains(line.trim()))
        .count();
    matches >= TOC_MIN_MATCHES
}

/// Remove a dense listing of known titles from the text
///
/// Text on the final listing line after its title is kept, as are lines
/// before the listing. Blank lines directly after the listing are dropped.
pub fn strip_toc(text: &str, known: &KnownTitles) -> String {
    if text.is_empty() || known.is_empty() {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();

    // (line index, byte end of the title when only a prefix of the line matched)
    let mut hits: Vec<(usize, Option<usize>)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();
        if known.contains(&upper) && upper.chars().count() < STRIP_MAX_TITLE_CHARS {
            hits.push((i, None));
        } else if let Some(end) = known.leading_title_end(trimmed) {
            hits.push((i, Some(end)));
        }
    }

    let (Some(&(first_idx, _)), Some(&(last_idx, last_partial))) = (hits.first(), hits.last())
    else {
        return text.to_string();
    };
    if hits.len() < STRIP_MIN_ENTRIES
        || (last_idx - first_idx) as f64 / hits.len() as f64 >= STRIP_MAX_DENSITY
    {
        return text.to_string();
    }

    let mut result: Vec<String> = lines[..first_idx].iter().map(|l| l.to_string()).collect();

    let mut after: Vec<String> = Vec::new();
    if let Some(title_end) = last_partial {
        let remainder = &lines[last_idx].trim()[title_end..];
        after.push(remainder.trim_start().to_string());
    }
    after.extend(lines[last_idx + 1..].iter().map(|l| l.to_string()));

    result.extend(after.into_iter().skip_while(|line| line.trim().is_empty()));
    result.join("\n")
}
