//! Paragraph and sentence segmentation

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r\u{a0}]*\n\s*").unwrap());

/// Abbreviations that end with a period but rarely end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "st.", "prof.", "jr.", "sr.", "vs.", "e.g.", "i.e.", "cf.",
    "mt.", "rev.", "gen.", "capt.", "lt.", "col.", "sgt.",
];

/// Split text into paragraphs on blank lines
///
/// Paragraphs are trimmed and empty ones dropped.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a paragraph into trimmed sentences
///
/// Boundaries follow UAX #29, with fragments ending in a known abbreviation or
/// a single initial ("J.") glued to the fragment that follows.
pub fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut pending = String::new();

    for bound in paragraph.split_sentence_bounds() {
        pending.push_str(bound);
        let trimmed = pending.trim();
        if trimmed.is_empty() {
            pending.clear();
            continue;
        }
        if ends_with_abbreviation(trimmed) {
            continue;
        }
        sentences.push(trimmed.to_string());
        pending.clear();
    }

    let rest = pending.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Split a sentence after every comma, semicolon or colon that is followed by
/// whitespace, keeping the delimiter on the clause it ends
///
/// Delimiters inside numbers and times ("3,000", "10:30") do not split.
pub fn split_clauses(sentence: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut chars = sentence.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_break = matches!(c, ',' | ';' | ':')
            && chars.peek().is_some_and(|next| next.is_whitespace());
        if at_break {
            let clause = current.trim();
            if !clause.is_empty() {
                clauses.push(clause.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        clauses.push(rest.to_string());
    }
    clauses
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    let Some(last_word) = fragment.split_whitespace().last() else {
        return false;
    };
    let word = last_word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    if ABBREVIATIONS.contains(&word.as_str()) {
        return true;
    }

    // Single initial such as "J."
    let mut chars = word.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_alphabetic()
    )
}
