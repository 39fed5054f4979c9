//! Token Stream
//!
//! The stream is an append-only arena of tokens that always ends with
//! exactly one `end` token. Parsers read it through `next` and `peek`, which
//! keep returning that `end` token once everything before it is consumed.
//! Tokens are handed out by reference or index and never copied out of the
//! arena by the stream itself.

use crate::lexical::error::LexerError;
use crate::lexical::scanner::Scanner;
use crate::tokens::token::{Token, TokenKind};
use crate::utils::{SourceMap, SourcePosition};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenStreamError {
    /// The scanner was asked for another token after `end` was appended
    #[error("{position}: token requested after end of input was reached")]
    ScanAfterEnd { position: SourcePosition },
}

impl TokenStreamError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::lexical::SCAN_AFTER_END
    }
}

/// Drives a `Scanner` one token at a time and collects its output
#[derive(Debug)]
pub struct TokenStreamBuilder {
    scanner: Scanner,
    tokens: Vec<Token>,
    diagnostics: Vec<LexerError>,
    ended: bool,
}

impl TokenStreamBuilder {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            ended: false,
        }
    }

    /// Scan and append one token. Fails once `end` has been appended.
    pub fn scan_next(&mut self) -> Result<&Token, TokenStreamError> {
        if self.ended {
            let position = self
                .tokens
                .last()
                .map(|token| token.position().clone())
                .unwrap_or_else(|| self.scanner.cursor().position());
            return Err(TokenStreamError::ScanAfterEnd { position });
        }
        Ok(self.push_next())
    }

    fn push_next(&mut self) -> &Token {
        let token = self.scanner.next_token();
        self.diagnostics.extend(self.scanner.take_diagnostics());
        self.ended = token.is(TokenKind::End);
        self.tokens.push(token);
        &self.tokens[self.tokens.len() - 1]
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Tokens appended so far, `end` included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn diagnostics(&self) -> &[LexerError] {
        &self.diagnostics
    }

    /// Scan whatever remains and seal the stream
    pub fn finish(mut self) -> TokenStream {
        while !self.ended {
            self.push_next();
        }
        TokenStream {
            source: self.scanner.cursor().shared_source(),
            tokens: self.tokens,
            diagnostics: self.diagnostics,
            position: 0,
        }
    }
}

/// Owns its tokens for its whole life. There is no way to copy the stream
/// or take the token arena out of it:
///
/// ```compile_fail
/// let stream = raven_lexer::lexical::tokenize("a.rv", "x");
/// let copy: raven_lexer::TokenStream = stream.clone();
/// ```
#[derive(Debug)]
pub struct TokenStream {
    source: Arc<str>,
    /// Never empty; the last token is the only `end` token
    tokens: Vec<Token>,
    diagnostics: Vec<LexerError>,
    /// Index of the next token `next` hands out
    position: usize,
}

impl TokenStream {
    /// Drive `scanner` to end of input
    pub fn scan(scanner: Scanner) -> Self {
        TokenStreamBuilder::new(scanner).finish()
    }

    fn sentinel_index(&self) -> usize {
        self.tokens.len().saturating_sub(1)
    }

    // === SEQUENTIAL ACCESS ===

    /// Consume the next token; the `end` token is returned on every call after
    /// the rest are used up
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> &Token {
        let index = self.position.min(self.sentinel_index());
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        &self.tokens[index]
    }

    /// The token `next` would return
    pub fn peek(&self) -> &Token {
        self.peek_ahead(0)
    }

    /// Token `n` places past `peek`, clamped to the `end` token
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let index = self.position.saturating_add(n).min(self.sentinel_index());
        &self.tokens[index]
    }

    /// Consume the next token only if it has `kind`
    pub fn next_if(&mut self, kind: TokenKind) -> Option<&Token> {
        if self.peek().is(kind) {
            Some(self.next())
        } else {
            None
        }
    }

    /// True once only the `end` token is left
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.sentinel_index()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    // === INDEXED ACCESS ===

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Tokens other than `newline`
    pub fn significant(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| token.kind().is_significant())
    }

    /// Number of tokens, `end` included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the stream holds nothing but `end`
    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }

    pub fn end_token(&self) -> &Token {
        &self.tokens[self.sentinel_index()]
    }

    // === SOURCE AND DIAGNOSTICS ===

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw source text of a token from this stream
    pub fn lexeme(&self, token: &Token) -> &str {
        token.span().slice(&self.source)
    }

    pub fn diagnostics(&self) -> &[LexerError] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Render a diagnostic with the offending source line underlined
    pub fn format_diagnostic(&self, error: &LexerError) -> String {
        let (file, _, message) = error.to_triple();
        SourceMap::new(Arc::clone(&self.source)).format_error(&file, &error.span(), &message)
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CommentSyntax;
    use crate::lexical::cursor::Cursor;
    use crate::lexical::scanner::ScannerOptions;
    use assert_matches::assert_matches;

    fn scanner(source: &str) -> Scanner {
        let options = ScannerOptions::new(CommentSyntax {
            line: vec!["#".to_string()],
            block: None,
        });
        Scanner::with_options(Cursor::new("t.rv", source), options)
    }

    fn stream(source: &str) -> TokenStream {
        TokenStream::scan(scanner(source))
    }

    #[test]
    fn test_exactly_one_end_token() {
        for source in ["", "a", "a b\n", "\"open", "@@@"] {
            let stream = stream(source);
            let ends = stream.iter().filter(|t| t.is(TokenKind::End)).count();
            assert_eq!(ends, 1, "{:?}", source);
            assert!(stream.tokens().last().unwrap().is(TokenKind::End));
        }
    }

    #[test]
    fn test_next_serves_end_forever() {
        let mut stream = stream("x + 1");
        assert_eq!(stream.next().kind(), TokenKind::Word);
        assert_eq!(stream.next().kind(), TokenKind::Plus);
        assert_eq!(stream.next().kind(), TokenKind::Number);
        assert!(stream.is_exhausted());
        for _ in 0..3 {
            assert_eq!(stream.next().kind(), TokenKind::End);
            assert_eq!(stream.peek().kind(), TokenKind::End);
        }
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut stream = stream("a = 2");
        assert_eq!(stream.peek().kind(), TokenKind::Word);
        assert_eq!(stream.peek_ahead(1).kind(), TokenKind::Assignment);
        assert_eq!(stream.peek_ahead(10).kind(), TokenKind::End);
        assert_eq!(stream.position(), 0);

        assert!(stream.next_if(TokenKind::Number).is_none());
        assert!(stream.next_if(TokenKind::Word).is_some());
        assert_eq!(stream.peek().kind(), TokenKind::Assignment);

        stream.reset();
        assert_eq!(stream.next().kind(), TokenKind::Word);
    }

    #[test]
    fn test_scan_after_end_is_rejected() {
        let mut builder = TokenStreamBuilder::new(scanner("1"));
        assert!(builder.scan_next().unwrap().is(TokenKind::Number));
        assert!(builder.scan_next().unwrap().is(TokenKind::End));
        assert!(builder.is_ended());

        let error = builder.scan_next().unwrap_err();
        assert_matches!(error, TokenStreamError::ScanAfterEnd { ref position } if position.line() == 1);
        assert_eq!(error.error_code().as_str(), "E029");
        assert_eq!(builder.len(), 2);

        let stream = builder.finish();
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_diagnostics_do_not_stop_the_stream() {
        let stream = stream("a @ \"open\nb");
        assert!(stream.has_errors());
        assert_eq!(stream.diagnostics().len(), 2);
        let kinds: Vec<_> = stream.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Word, TokenKind::Newline, TokenKind::Word, TokenKind::End]
        );
    }

    #[test]
    fn test_lexeme_and_significant() {
        let stream = stream("a <<= 'x'\nb");
        let lexemes: Vec<_> = stream.significant().map(|t| stream.lexeme(t)).collect();
        assert_eq!(lexemes, vec!["a", "<<=", "'x'", "b", ""]);
        assert_eq!(stream.len(), 6);
        assert!(!stream.is_empty());
        assert!(super::TokenStream::scan(scanner("")).is_empty());
    }

    #[test]
    fn test_tokens_are_lent_from_the_arena() {
        let mut stream = stream("a b");
        let arena: *const Token = &stream.tokens()[0];
        assert!(std::ptr::eq(stream.get(0).unwrap(), arena));
        assert!(std::ptr::eq(stream.peek(), arena));
        assert!(std::ptr::eq(stream.next(), arena));
        assert!(std::ptr::eq(stream.iter().next().unwrap(), &stream.tokens()[0]));
    }

    #[test]
    fn test_format_diagnostic() {
        let stream = stream("x = 1.2.3");
        let rendered = stream.format_diagnostic(&stream.diagnostics()[0]);
        assert!(rendered.contains("malformed number '1.2.3'"));
        assert!(rendered.contains("x = 1.2.3"));
    }
}
