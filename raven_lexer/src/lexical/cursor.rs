//! Source Cursor
//!
//! Owns the source text and its filename, and tracks the byte offset and
//! 1-based line of the next unread character. Past the last character every
//! `peek` and `advance` reports `None`; nothing here can fail.
use crate::config::constants::LINE_TERMINATOR;
use crate::utils::{SourcePosition, Span};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Cursor {
    filename: Arc<str>,
    source: Arc<str>,
    offset: usize,
    line: u32,
}

impl Cursor {
    pub fn new(filename: impl Into<Arc<str>>, source: impl Into<Arc<str>>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
            offset: 0,
            line: 1,
        }
    }

    /// Character `k` positions ahead of the current one, `None` past the end
    pub fn peek(&self, k: usize) -> Option<char> {
        self.rest().chars().nth(k)
    }

    pub fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character, counting line terminators
    pub fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.offset += c.len_utf8();
        if c == LINE_TERMINATOR {
            self.line += 1;
        }
        Some(c)
    }

    /// Consume `count` characters; stops early at end of input
    pub fn advance_by(&mut self, count: usize) -> usize {
        let mut consumed = 0;
        while consumed < count && self.advance().is_some() {
            consumed += 1;
        }
        consumed
    }

    /// Consume `expected` if it is the current character
    pub fn eat(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `prefix` if the unread input starts with it
    pub fn eat_str(&mut self, prefix: &str) -> bool {
        if !prefix.is_empty() && self.starts_with(prefix) {
            self.advance_by(prefix.chars().count());
            true
        } else {
            false
        }
    }

    /// Consume characters while `predicate` holds; returns the bytes consumed
    pub fn advance_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> usize {
        let start = self.offset;
        while let Some(c) = self.current() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
        self.offset - start
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Unread input
    pub fn rest(&self) -> &str {
        self.source.get(self.offset..).unwrap_or("")
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn shared_source(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    /// Position of the next unread character
    pub fn position(&self) -> SourcePosition {
        SourcePosition::from_shared(&self.filename, self.line)
    }

    /// Span from `start` up to the current offset
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset)
    }

    /// Source text from `start` up to the current offset
    pub fn slice_from(&self, start: usize) -> &str {
        self.source.get(start..self.offset).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let cursor = Cursor::new("t.rv", "ab");
        assert_eq!(cursor.peek(0), Some('a'));
        assert_eq!(cursor.peek(1), Some('b'));
        assert_eq!(cursor.peek(2), None);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_advance_counts_lines_only() {
        let mut cursor = Cursor::new("t.rv", "a\nb\n");
        cursor.advance();
        assert_eq!(cursor.line(), 1);
        cursor.advance();
        assert_eq!(cursor.line(), 2);
        assert_eq!(cursor.advance_by(5), 2);
        assert_eq!(cursor.line(), 3);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut cursor = Cursor::new("t.rv", "");
        for _ in 0..3 {
            assert_eq!(cursor.peek(0), None);
            assert_eq!(cursor.advance(), None);
        }
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.line(), 1);
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut cursor = Cursor::new("t.rv", "é1");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.rest(), "1");
        assert_eq!(cursor.slice_from(0), "é");
    }

    #[test]
    fn test_eat_and_advance_while() {
        let mut cursor = Cursor::new("t.rv", "<<=123x");
        assert!(cursor.eat_str("<<="));
        assert!(!cursor.eat('x'));
        assert_eq!(cursor.advance_while(|c| c.is_ascii_digit()), 3);
        assert!(cursor.eat('x'));
        assert_eq!(cursor.span_from(3), Span::new(3, 7));
        assert_eq!(cursor.position().to_string(), "t.rv:1");
    }
}
