//! Scanner state machine
//!
//! Each call to `next_token` skips whitespace and comments, then picks a rule
//! from the first character alone: line terminator, end of input, digit,
//! quote, word start, operator, external recognizer. Only the operator rule
//! looks further ahead, and never more than three characters.
//!
//! Lexical errors never stop the scanner. They are recorded, the offending
//! text is consumed, and scanning resumes with the next lexeme, so every
//! input eventually yields `end`.
use crate::config::compile_time::lexical::{
    MAX_COMMENT_LENGTH, MAX_IDENTIFIER_LENGTH, MAX_STRING_SIZE,
};
use crate::config::constants::{HORIZONTAL_WHITESPACE, LINE_TERMINATOR, STRING_QUOTES};
use crate::config::runtime::{CommentSyntax, LexicalPreferences};
use crate::grammar::{match_operator, Keyword};
use crate::lexical::cursor::Cursor;
use crate::lexical::error::{LexerError, LexerErrorKind};
use crate::lexical::recognizer::RecognizerSet;
use crate::tokens::{Token, TokenKind};
use crate::utils::{SourcePosition, Span};

/// Scanner behaviour that varies per run
#[derive(Debug, Clone)]
pub struct ScannerOptions {
    /// Emit one `newline` for a run of blank lines
    pub coalesce_newlines: bool,
    pub comments: CommentSyntax,
    pub max_identifier_length: usize,
    pub max_string_size: usize,
    pub max_comment_length: usize,
}

impl ScannerOptions {
    /// Compile-time limits, newline coalescing on, the given comment syntax
    pub fn new(comments: CommentSyntax) -> Self {
        Self {
            coalesce_newlines: true,
            comments,
            max_identifier_length: MAX_IDENTIFIER_LENGTH,
            max_string_size: MAX_STRING_SIZE,
            max_comment_length: MAX_COMMENT_LENGTH,
        }
    }

    pub fn from_preferences(preferences: &LexicalPreferences) -> Self {
        Self {
            coalesce_newlines: preferences.coalesce_newlines,
            ..Self::new(preferences.comments.clone())
        }
    }
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self::from_preferences(&LexicalPreferences::default())
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Decoded value of `\c`, or `None` for an unknown escape
fn decode_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' | '"' | '\'' => Some(c),
        _ => None,
    }
}

#[derive(Debug)]
pub struct Scanner {
    cursor: Cursor,
    options: ScannerOptions,
    recognizers: RecognizerSet,
    diagnostics: Vec<LexerError>,
}

impl Scanner {
    pub fn new(cursor: Cursor) -> Self {
        Self::with_options(cursor, ScannerOptions::default())
    }

    pub fn with_options(cursor: Cursor, options: ScannerOptions) -> Self {
        Self {
            cursor,
            options,
            recognizers: RecognizerSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_recognizers(mut self, recognizers: RecognizerSet) -> Self {
        self.recognizers = recognizers;
        self
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn options(&self) -> &ScannerOptions {
        &self.options
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Diagnostics recorded since the last call
    pub fn take_diagnostics(&mut self) -> Vec<LexerError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Produce the next token. At end of input this returns `end` on every call.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let start = self.cursor.offset();
            let position = self.cursor.position();
            let Some(c) = self.cursor.current() else {
                return Token::bare(TokenKind::End, position, self.cursor.span_from(start));
            };

            let token = if c == LINE_TERMINATOR {
                Some(self.scan_newline(start, position))
            } else if c.is_ascii_digit() {
                self.scan_number(start, position)
            } else if STRING_QUOTES.contains(&c) {
                self.scan_string(c, start, position)
            } else if is_word_start(c) {
                self.scan_word(start, position)
            } else if let Some((kind, length)) = match_operator(self.cursor.rest()) {
                self.cursor.advance_by(length);
                Some(Token::bare(kind, position, self.cursor.span_from(start)))
            } else if let Some(recognized) = self.recognizers.recognize(self.cursor.rest()) {
                self.cursor.advance_by(recognized.consumed);
                Some(Token::external(
                    recognized.kind,
                    recognized.payload,
                    position,
                    self.cursor.span_from(start),
                ))
            } else {
                self.cursor.advance();
                self.report(LexerErrorKind::UnrecognizedCharacter, position, start);
                None
            };

            if let Some(token) = token {
                return token;
            }
        }
    }

    fn report(&mut self, kind: LexerErrorKind, position: SourcePosition, start: usize) {
        let error = LexerError::at(
            kind,
            position,
            self.cursor.span_from(start),
            self.cursor.slice_from(start),
        );
        self.diagnostics.push(error);
    }

    fn report_too_large(
        &mut self,
        kind: LexerErrorKind,
        position: SourcePosition,
        start: usize,
        length: usize,
        limit: usize,
    ) {
        let error = LexerError::too_large(
            kind,
            position,
            self.cursor.span_from(start),
            self.cursor.slice_from(start),
            length,
            limit,
        );
        self.diagnostics.push(error);
    }

    // === WHITESPACE AND COMMENTS ===

    fn skip_trivia(&mut self) {
        loop {
            self.cursor
                .advance_while(|c| HORIZONTAL_WHITESPACE.contains(&c));
            if !(self.skip_line_comment() || self.skip_block_comment()) {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) -> bool {
        let opens_comment = self
            .options
            .comments
            .line
            .iter()
            .any(|prefix| !prefix.is_empty() && self.cursor.starts_with(prefix));
        if !opens_comment {
            return false;
        }

        let start = self.cursor.offset();
        let position = self.cursor.position();
        self.cursor.advance_while(|c| c != LINE_TERMINATOR);
        self.check_comment_length(start, position);
        true
    }

    fn skip_block_comment(&mut self) -> bool {
        let Some((open, close)) = &self.options.comments.block else {
            return false;
        };
        if open.is_empty() || close.is_empty() || !self.cursor.starts_with(open) {
            return false;
        }

        let start = self.cursor.offset();
        let position = self.cursor.position();
        self.cursor.eat_str(open);
        let mut terminated = false;
        while !self.cursor.is_at_end() {
            if self.cursor.eat_str(close) {
                terminated = true;
                break;
            }
            self.cursor.advance();
        }

        if terminated {
            self.check_comment_length(start, position);
        } else {
            self.report(LexerErrorKind::UnterminatedComment, position, start);
        }
        true
    }

    fn check_comment_length(&mut self, start: usize, position: SourcePosition) {
        let length = self.cursor.offset() - start;
        let limit = self.options.max_comment_length;
        if length > limit {
            self.report_too_large(LexerErrorKind::CommentTooLong, position, start, length, limit);
        }
    }

    // === LEXEME RULES ===

    fn scan_newline(&mut self, start: usize, position: SourcePosition) -> Token {
        self.cursor.advance();
        let mut end = self.cursor.offset();

        if self.options.coalesce_newlines {
            loop {
                self.skip_trivia();
                if !self.cursor.eat(LINE_TERMINATOR) {
                    break;
                }
                end = self.cursor.offset();
            }
        }

        Token::bare(TokenKind::Newline, position, Span::new(start, end))
    }

    fn scan_number(&mut self, start: usize, position: SourcePosition) -> Option<Token> {
        self.cursor.advance_while(|c| c.is_ascii_digit());

        if self.cursor.current() == Some('.') {
            match self.cursor.peek(1) {
                Some(c) if c.is_ascii_digit() => {
                    self.cursor.advance();
                    self.cursor.advance_while(|c| c.is_ascii_digit());

                    // Any further point that does not open `..` takes the whole run
                    if self.cursor.current() == Some('.') && self.cursor.peek(1) != Some('.') {
                        self.cursor.advance_while(|c| is_word_char(c) || c == '.');
                        self.report(LexerErrorKind::MalformedNumber, position, start);
                        return None;
                    }
                }
                // `1..` is a number followed by dots
                Some('.') => {}
                _ => {
                    self.cursor.advance();
                    self.report(LexerErrorKind::MalformedNumber, position, start);
                    return None;
                }
            }
        }

        if matches!(self.cursor.current(), Some(c) if is_word_char(c)) {
            self.cursor.advance_while(is_word_char);
            self.report(LexerErrorKind::MalformedNumber, position, start);
            return None;
        }

        match self.cursor.slice_from(start).parse::<f64>() {
            Ok(value) if value.is_finite() => {
                Some(Token::number(value, position, self.cursor.span_from(start)))
            }
            // overflow parses as infinity
            _ => {
                self.report(LexerErrorKind::MalformedNumber, position, start);
                None
            }
        }
    }

    fn scan_string(
        &mut self,
        quote: char,
        start: usize,
        position: SourcePosition,
    ) -> Option<Token> {
        self.cursor.advance();
        let mut text = String::new();
        let mut valid = true;

        loop {
            match self.cursor.current() {
                None | Some(LINE_TERMINATOR) => {
                    self.report(LexerErrorKind::UnterminatedString, position, start);
                    return None;
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    let escape_start = self.cursor.offset();
                    let escape_position = self.cursor.position();
                    self.cursor.advance();
                    match self.cursor.current() {
                        // Line continuation
                        Some(LINE_TERMINATOR) => {
                            self.cursor.advance();
                        }
                        Some('\r') if self.cursor.peek(1) == Some(LINE_TERMINATOR) => {
                            self.cursor.advance_by(2);
                        }
                        Some(c) => {
                            self.cursor.advance();
                            match decode_escape(c) {
                                Some(decoded) => text.push(decoded),
                                None => {
                                    valid = false;
                                    self.report(
                                        LexerErrorKind::InvalidEscapeSequence,
                                        escape_position,
                                        escape_start,
                                    );
                                }
                            }
                        }
                        None => {}
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.cursor.advance();
                }
            }
        }

        if !valid {
            return None;
        }

        let limit = self.options.max_string_size;
        if text.len() > limit {
            self.report_too_large(
                LexerErrorKind::StringTooLarge,
                position,
                start,
                text.len(),
                limit,
            );
            return None;
        }

        Some(Token::text(
            TokenKind::String,
            text,
            position,
            self.cursor.span_from(start),
        ))
    }

    fn scan_word(&mut self, start: usize, position: SourcePosition) -> Option<Token> {
        self.cursor.advance_while(is_word_char);

        let length = self.cursor.offset() - start;
        let limit = self.options.max_identifier_length;
        if length > limit {
            self.report_too_large(
                LexerErrorKind::IdentifierTooLong,
                position,
                start,
                length,
                limit,
            );
            return None;
        }

        let span = self.cursor.span_from(start);
        let spelling = self.cursor.slice_from(start);
        let token = match Keyword::lookup(spelling) {
            Some(keyword) => Token::bare(TokenKind::Keyword(keyword), position, span),
            None => Token::text(TokenKind::Word, spelling.to_string(), position, span),
        };
        Some(token)
    }
}
