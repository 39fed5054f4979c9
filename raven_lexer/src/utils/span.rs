//! Source location tracking
//!
//! Tokens carry a `SourcePosition` (file and 1-based line) for diagnostics and
//! a byte `Span` so the exact lexeme can be sliced back out of the source.
//! Columns are not tracked; `SourceMap` recovers them on demand when a
//! diagnostic is rendered.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Half-open byte range `start..end` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Zero-width span, used by the end-of-input sentinel
    pub fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Text covered by the span; empty when it does not fit `input`
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// File name plus the 1-based line where a lexeme begins.
///
/// The file name is shared between every token of a scan, so cloning a
/// position is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    filename: Arc<str>,
    line: u32,
}

impl SourcePosition {
    pub fn new(filename: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }

    pub(crate) fn from_shared(filename: &Arc<str>, line: u32) -> Self {
        Self {
            filename: Arc::clone(filename),
            line,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

impl Serialize for SourcePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourcePosition", 2)?;
        state.serialize_field("file", &*self.filename)?;
        state.serialize_field("line", &self.line)?;
        state.end()
    }
}

/// Line index over a source buffer
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: Arc<str>,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> u32 {
        let index = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        (index + 1) as u32
    }

    /// 1-based character column of `offset`
    pub fn column_of(&self, offset: usize) -> u32 {
        let line_start = self.line_starts[self.line_of(offset) as usize - 1];
        (self.source[line_start..offset].chars().count() + 1) as u32
    }

    /// Text of a 1-based line without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let index = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn span_text(&self, span: &Span) -> &str {
        span.slice(&self.source)
    }

    /// Render a diagnostic with the offending line and a caret underline
    pub fn format_error(&self, filename: &str, span: &Span, message: &str) -> String {
        let line = self.line_of(span.start);
        let column = self.column_of(span.start);

        let mut result = format!("error: {}\n  --> {}:{}:{}\n", message, filename, line, column);

        if let Some(text) = self.get_line(line) {
            let gutter = line.to_string();
            let padding = " ".repeat(gutter.len());

            // Underline stops at the end of the first line for multi-line lexemes
            let line_remaining = text.chars().count().saturating_sub(column as usize - 1);
            let width = span.slice(&self.source)
                .split('\n')
                .next()
                .map(|first| first.chars().count())
                .unwrap_or(0)
                .min(line_remaining)
                .max(1);

            result.push_str(&format!(" {} |\n", padding));
            result.push_str(&format!(" {} | {}\n", gutter, text));
            result.push_str(&format!(
                " {} | {}{}\n",
                padding,
                " ".repeat(column as usize - 1),
                "^".repeat(width)
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::new(2, 5);
        assert_eq!(span.len(), 3);
        assert!(span.contains(4));
        assert!(!span.contains(5));
        assert_eq!(span.slice("a<<=b"), "<=b");
        assert_eq!(span.merge(Span::new(0, 3)), Span::new(0, 5));
        assert!(Span::empty_at(9).is_empty());
    }

    #[test]
    fn test_source_position_display_and_json() {
        let position = SourcePosition::new("lib.rv", 12);
        assert_eq!(position.to_string(), "lib.rv:12");

        let json = serde_json::to_value(&position).unwrap();
        assert_eq!(json, serde_json::json!({"file": "lib.rv", "line": 12}));
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("var a\r\nreturn a\n\nend");

        assert_eq!(map.line_count(), 4);
        assert_eq!(map.line_of(0), 1);
        assert_eq!(map.line_of(7), 2);
        assert_eq!(map.line_of(16), 3);
        assert_eq!(map.get_line(1), Some("var a"));
        assert_eq!(map.get_line(2), Some("return a"));
        assert_eq!(map.get_line(3), Some(""));
        assert_eq!(map.get_line(4), Some("end"));
        assert_eq!(map.get_line(0), None);
        assert_eq!(map.get_line(5), None);
    }

    #[test]
    fn test_format_error_underlines_lexeme() {
        let map = SourceMap::new("var x = 1.2.3\n");
        let rendered = map.format_error("calc.rv", &Span::new(8, 13), "malformed number");

        assert!(rendered.starts_with("error: malformed number\n  --> calc.rv:1:9\n"));
        assert!(rendered.contains(" 1 | var x = 1.2.3\n"));
        assert!(rendered.ends_with("   |         ^^^^^\n"));
    }
}
