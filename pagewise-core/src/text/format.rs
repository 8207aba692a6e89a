//! Output styles applied to extracted text

use super::segment::{split_clauses, split_paragraphs, split_sentences};

/// Short single-line paragraphs without closing punctuation are treated as
/// headings and left untouched
fn is_heading_like(paragraph: &str) -> bool {
    paragraph.chars().count() < 100
        && !paragraph
            .trim_end()
            .ends_with(['.', '!', '?', '"', '\'', '\u{201d}', '\u{2019}'])
        && !paragraph.contains('\n')
}

fn collapse_lines(paragraph: &str) -> String {
    paragraph.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Put every paragraph on its own line, prefixing all but the first (and
/// headings) with `separator`
///
/// With `one_line` set, line breaks inside a paragraph are folded into spaces.
pub fn format_paragraphs(text: &str, separator: &str, one_line: bool) -> String {
    let mut parts = Vec::new();

    for (i, paragraph) in split_paragraphs(text).into_iter().enumerate() {
        let paragraph = if one_line {
            collapse_lines(&paragraph)
        } else {
            paragraph
        };

        if i == 0 || separator.is_empty() || is_heading_like(&paragraph) {
            parts.push(paragraph);
        } else {
            parts.push(format!("{}{}", separator, paragraph));
        }
    }

    parts.join("\n")
}

/// One sentence per line, with `separator` marking the start of each
/// paragraph after the first
pub fn format_sentences(text: &str, separator: &str) -> String {
    let mut lines = Vec::new();

    for (i, paragraph) in split_paragraphs(text).into_iter().enumerate() {
        if is_heading_like(&paragraph) {
            lines.push(paragraph);
            continue;
        }

        for (j, sentence) in split_sentences(&collapse_lines(&paragraph)).into_iter().enumerate() {
            if i > 0 && j == 0 && !separator.is_empty() {
                lines.push(format!("{}{}", separator, sentence));
            } else {
                lines.push(sentence);
            }
        }
    }

    lines.join("\n")
}

/// One clause per line, with `separator` marking the start of each
/// paragraph after the first
///
/// Sentences are split first, then each sentence after its commas,
/// semicolons and colons. Delimiters stay at the end of their clause.
pub fn format_clauses(text: &str, separator: &str) -> String {
    let mut lines = Vec::new();

    for (i, paragraph) in split_paragraphs(text).into_iter().enumerate() {
        if is_heading_like(&paragraph) {
            lines.push(paragraph);
            continue;
        }

        let clauses = split_sentences(&collapse_lines(&paragraph))
            .into_iter()
            .flat_map(|sentence| split_clauses(&sentence))
            .enumerate();
        for (j, clause) in clauses {
            if i > 0 && j == 0 && !separator.is_empty() {
                lines.push(format!("{}{}", separator, clause));
            } else {
                lines.push(clause);
            }
        }
    }

    lines.join("\n")
}

/// Break lines longer than `max_length` chars
///
/// A long line is split into sentences first; a sentence that is still too
/// long is packed clause by clause, and a clause that is still too long word
/// by word. A single word longer than the limit keeps its own line. Heading
/// lines are left alone, and a leading `separator` stays on the first piece.
pub fn split_long_lines(text: &str, max_length: usize, separator: &str) -> String {
    let mut lines = Vec::new();

    for line in text.split('\n') {
        let trimmed = line.trim();
        let heading = !trimmed.is_empty() && is_heading_like(trimmed);
        if heading || line.chars().count() <= max_length {
            lines.push(line.to_string());
            continue;
        }

        let (prefix, content) = match line.strip_prefix(separator) {
            Some(content) if !separator.is_empty() => (separator, content),
            _ => ("", line),
        };
        for (k, piece) in wrap_line(content, max_length).into_iter().enumerate() {
            if k == 0 {
                lines.push(format!("{}{}", prefix, piece));
            } else {
                lines.push(piece);
            }
        }
    }

    lines.join("\n")
}

fn wrap_line(content: &str, max_length: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for sentence in split_sentences(content) {
        if sentence.chars().count() <= max_length {
            pieces.push(sentence);
            continue;
        }

        let mut units = Vec::new();
        for clause in split_clauses(&sentence) {
            if clause.chars().count() <= max_length {
                units.push(clause);
            } else {
                units.extend(clause.split_whitespace().map(str::to_string));
            }
        }
        pieces.extend(pack(units, max_length));
    }

    pieces
}

/// Greedily join units with spaces into lines of at most `max_length` chars
fn pack(units: Vec<String>, max_length: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit_len = unit.chars().count();
        if current.is_empty() {
            current = unit;
            current_len = unit_len;
        } else if current_len + 1 + unit_len <= max_length {
            current.push(' ');
            current.push_str(&unit);
            current_len += 1 + unit_len;
        } else {
            lines.push(std::mem::replace(&mut current, unit));
            current_len = unit_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
