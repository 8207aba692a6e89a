//! Plain-text cleanup applied after markup rendering

use regex::Regex;
use std::sync::LazyLock;

/// Bracketed numeric footnote references such as `[12]`
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d{1,4}\]").unwrap());

/// Runs of horizontal whitespace, including non-breaking spaces
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}\u{2009}\u{202f}]+").unwrap());

/// Three or more newlines
static EXTRA_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Text cleaner with independently switchable passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCleaner {
    remove_footnotes: bool,
    remove_page_numbers: bool,
    normalize_whitespace: bool,
    preserve_single_newlines: bool,
}

impl TextCleaner {
    /// Cleaner with every pass enabled and paragraphs separated by blank lines
    pub fn new() -> Self {
        Self {
            remove_footnotes: true,
            remove_page_numbers: true,
            normalize_whitespace: true,
            preserve_single_newlines: false,
        }
    }

    /// Remove bracketed footnote references like `[1]`
    pub fn with_remove_footnotes(mut self, remove: bool) -> Self {
        self.remove_footnotes = remove;
        self
    }

    /// Remove lines consisting of a bare number
    pub fn with_remove_page_numbers(mut self, remove: bool) -> Self {
        self.remove_page_numbers = remove;
        self
    }

    /// Collapse runs of spaces and trim every line
    pub fn with_normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    /// Keep single newlines instead of joining the lines of a paragraph
    pub fn with_preserve_single_newlines(mut self, preserve: bool) -> Self {
        self.preserve_single_newlines = preserve;
        self
    }

    pub fn preserves_single_newlines(&self) -> bool {
        self.preserve_single_newlines
    }

    /// Clean rendered text
    pub fn clean(&self, text: &str) -> String {
        let mut text = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.remove_footnotes {
            text = FOOTNOTE_RE.replace_all(&text, "").into_owned();
        }

        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if self.normalize_whitespace {
            for line in &mut lines {
                *line = SPACES_RE.replace_all(line, " ").trim().to_string();
            }
        }
        if self.remove_page_numbers {
            lines.retain(|line| {
                let trimmed = line.trim();
                trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit())
            });
        }

        let text = lines.join("\n");
        let text = EXTRA_NEWLINES_RE.replace_all(&text, "\n\n");

        let text = if self.preserve_single_newlines {
            text.into_owned()
        } else {
            text.split("\n\n")
                .map(|paragraph| paragraph.replace('\n', " "))
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of cleaned text as reported in `char_count`
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}
