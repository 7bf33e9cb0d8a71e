//! Line-oriented documents and their numbered rendering.
//!
//! A [`Document`] is the unit every edit is applied to. An
//! [`IndexedDocument`] is the same text with a visible `[NNN] ` marker in
//! front of each line so the model can point at lines unambiguously. The
//! indexed form only ever travels to the model; edits are always applied to
//! the plain document.

use std::fmt;

/// Minimum width of the line ordinal inside an index marker.
const ORDINAL_WIDTH: usize = 3;

/// An ordered sequence of text lines.
///
/// Splitting on `\n` and joining with `\n` round-trips the original text
/// exactly, including a trailing newline (kept as a final empty line) and any
/// `\r` characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Creates a document from already split lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the lines of the document.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the 1-based line, if it exists.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns true if the document contains only whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Returns true if any line contains `ch`.
    pub fn contains_char(&self, ch: char) -> bool {
        self.lines.iter().any(|line| line.contains(ch))
    }

    /// Renders the numbered view of this document.
    pub fn index(&self) -> IndexedDocument {
        let text = self
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| format!("[{:>width$}] {line}", idx + 1, width = ORDINAL_WIDTH))
            .collect::<Vec<_>>()
            .join("\n");

        IndexedDocument { text }
    }

    /// Returns the document as a single string.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::from_lines(text.split('\n'))
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// A document rendered with `[NNN] ` line markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    text: String,
}

impl IndexedDocument {
    /// Returns the rendered text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Removes the line markers and returns the plain document.
    ///
    /// Only the leading marker of each line is removed; brackets inside the
    /// line content are left alone.
    pub fn strip(&self) -> Document {
        Document::from_lines(self.text.split('\n').map(strip_marker))
    }
}

impl fmt::Display for IndexedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Removes a leading `[NNN] ` marker from a line.
fn strip_marker(line: &str) -> &str {
    line.strip_prefix('[')
        .and_then(|rest| rest.split_once("] "))
        .filter(|(ordinal, _)| {
            let ordinal = ordinal.trim_start();
            !ordinal.is_empty() && ordinal.bytes().all(|b| b.is_ascii_digit())
        })
        .map_or(line, |(_, content)| content)
}
