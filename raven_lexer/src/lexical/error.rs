//! Lexical diagnostics
//!
//! Every variant is recoverable: the scanner records it, steps past the
//! offending text and keeps going.
use crate::config::constants::MAX_DIAGNOSTIC_LEXEME;
use crate::logging::codes::lexical;
use crate::logging::Code;
use crate::utils::{SourcePosition, Span};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexerErrorKind {
    UnrecognizedCharacter,
    UnterminatedString,
    MalformedNumber,
    InvalidEscapeSequence,
    UnterminatedComment,
    IdentifierTooLong,
    StringTooLarge,
    CommentTooLong,
}

impl LexerErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnrecognizedCharacter => "unrecognized_character",
            Self::UnterminatedString => "unterminated_string",
            Self::MalformedNumber => "malformed_number",
            Self::InvalidEscapeSequence => "invalid_escape_sequence",
            Self::UnterminatedComment => "unterminated_comment",
            Self::IdentifierTooLong => "identifier_too_long",
            Self::StringTooLarge => "string_too_large",
            Self::CommentTooLong => "comment_too_long",
        }
    }
}

impl fmt::Display for LexerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LexerError {
    #[error("{position}: unrecognized character '{lexeme}'")]
    UnrecognizedCharacter {
        position: SourcePosition,
        span: Span,
        lexeme: String,
    },

    #[error("{position}: unterminated string {lexeme}")]
    UnterminatedString {
        position: SourcePosition,
        span: Span,
        lexeme: String,
    },

    #[error("{position}: malformed number '{lexeme}'")]
    MalformedNumber {
        position: SourcePosition,
        span: Span,
        lexeme: String,
    },

    #[error("{position}: invalid escape sequence '{lexeme}'")]
    InvalidEscapeSequence {
        position: SourcePosition,
        span: Span,
        lexeme: String,
    },

    #[error("{position}: unterminated block comment")]
    UnterminatedComment {
        position: SourcePosition,
        span: Span,
        lexeme: String,
    },

    #[error("{position}: identifier is {length} characters, limit is {limit}")]
    IdentifierTooLong {
        position: SourcePosition,
        span: Span,
        lexeme: String,
        length: usize,
        limit: usize,
    },

    #[error("{position}: string literal is {length} bytes, limit is {limit}")]
    StringTooLarge {
        position: SourcePosition,
        span: Span,
        lexeme: String,
        length: usize,
        limit: usize,
    },

    #[error("{position}: comment is {length} bytes, limit is {limit}")]
    CommentTooLong {
        position: SourcePosition,
        span: Span,
        lexeme: String,
        length: usize,
        limit: usize,
    },
}

impl LexerError {
    /// Build a diagnostic of a kind that carries no size information
    pub(crate) fn at(
        kind: LexerErrorKind,
        position: SourcePosition,
        span: Span,
        lexeme: &str,
    ) -> Self {
        let lexeme = truncate_lexeme(lexeme);
        match kind {
            LexerErrorKind::UnterminatedString => Self::UnterminatedString {
                position,
                span,
                lexeme,
            },
            LexerErrorKind::MalformedNumber => Self::MalformedNumber {
                position,
                span,
                lexeme,
            },
            LexerErrorKind::InvalidEscapeSequence => Self::InvalidEscapeSequence {
                position,
                span,
                lexeme,
            },
            LexerErrorKind::UnterminatedComment => Self::UnterminatedComment {
                position,
                span,
                lexeme,
            },
            LexerErrorKind::UnrecognizedCharacter => Self::UnrecognizedCharacter {
                position,
                span,
                lexeme,
            },
            LexerErrorKind::IdentifierTooLong
            | LexerErrorKind::StringTooLarge
            | LexerErrorKind::CommentTooLong => {
                unreachable!("{} needs a length and limit", kind)
            }
        }
    }

    /// Build a size-limit diagnostic
    pub(crate) fn too_large(
        kind: LexerErrorKind,
        position: SourcePosition,
        span: Span,
        lexeme: &str,
        length: usize,
        limit: usize,
    ) -> Self {
        let lexeme = truncate_lexeme(lexeme);
        match kind {
            LexerErrorKind::StringTooLarge => Self::StringTooLarge {
                position,
                span,
                lexeme,
                length,
                limit,
            },
            LexerErrorKind::CommentTooLong => Self::CommentTooLong {
                position,
                span,
                lexeme,
                length,
                limit,
            },
            LexerErrorKind::IdentifierTooLong => Self::IdentifierTooLong {
                position,
                span,
                lexeme,
                length,
                limit,
            },
            LexerErrorKind::UnrecognizedCharacter
            | LexerErrorKind::UnterminatedString
            | LexerErrorKind::MalformedNumber
            | LexerErrorKind::InvalidEscapeSequence
            | LexerErrorKind::UnterminatedComment => {
                unreachable!("{} carries no size", kind)
            }
        }
    }

    pub fn kind(&self) -> LexerErrorKind {
        match self {
            Self::UnrecognizedCharacter { .. } => LexerErrorKind::UnrecognizedCharacter,
            Self::UnterminatedString { .. } => LexerErrorKind::UnterminatedString,
            Self::MalformedNumber { .. } => LexerErrorKind::MalformedNumber,
            Self::InvalidEscapeSequence { .. } => LexerErrorKind::InvalidEscapeSequence,
            Self::UnterminatedComment { .. } => LexerErrorKind::UnterminatedComment,
            Self::IdentifierTooLong { .. } => LexerErrorKind::IdentifierTooLong,
            Self::StringTooLarge { .. } => LexerErrorKind::StringTooLarge,
            Self::CommentTooLong { .. } => LexerErrorKind::CommentTooLong,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Self::UnrecognizedCharacter { position, .. }
            | Self::UnterminatedString { position, .. }
            | Self::MalformedNumber { position, .. }
            | Self::InvalidEscapeSequence { position, .. }
            | Self::UnterminatedComment { position, .. }
            | Self::IdentifierTooLong { position, .. }
            | Self::StringTooLarge { position, .. }
            | Self::CommentTooLong { position, .. } => position,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnrecognizedCharacter { span, .. }
            | Self::UnterminatedString { span, .. }
            | Self::MalformedNumber { span, .. }
            | Self::InvalidEscapeSequence { span, .. }
            | Self::UnterminatedComment { span, .. }
            | Self::IdentifierTooLong { span, .. }
            | Self::StringTooLarge { span, .. }
            | Self::CommentTooLong { span, .. } => *span,
        }
    }

    /// Offending text, possibly truncated
    pub fn lexeme(&self) -> &str {
        match self {
            Self::UnrecognizedCharacter { lexeme, .. }
            | Self::UnterminatedString { lexeme, .. }
            | Self::MalformedNumber { lexeme, .. }
            | Self::InvalidEscapeSequence { lexeme, .. }
            | Self::UnterminatedComment { lexeme, .. }
            | Self::IdentifierTooLong { lexeme, .. }
            | Self::StringTooLarge { lexeme, .. }
            | Self::CommentTooLong { lexeme, .. } => lexeme,
        }
    }

    pub fn filename(&self) -> &str {
        self.position().filename()
    }

    pub fn line(&self) -> u32 {
        self.position().line()
    }

    pub fn error_code(&self) -> Code {
        match self.kind() {
            LexerErrorKind::UnrecognizedCharacter => lexical::UNRECOGNIZED_CHARACTER,
            LexerErrorKind::UnterminatedString => lexical::UNTERMINATED_STRING,
            LexerErrorKind::MalformedNumber => lexical::MALFORMED_NUMBER,
            LexerErrorKind::InvalidEscapeSequence => lexical::INVALID_ESCAPE_SEQUENCE,
            LexerErrorKind::UnterminatedComment => lexical::UNTERMINATED_COMMENT,
            LexerErrorKind::IdentifierTooLong => lexical::IDENTIFIER_TOO_LONG,
            LexerErrorKind::StringTooLarge => lexical::STRING_TOO_LARGE,
            LexerErrorKind::CommentTooLong => lexical::COMMENT_TOO_LONG,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        crate::logging::codes::is_recoverable(self.error_code().as_str())
    }

    /// The (file, line, message) triple handed to diagnostic reporting
    pub fn to_triple(&self) -> (String, u32, String) {
        let message = self.to_string();
        let message = message
            .strip_prefix(&format!("{}: ", self.position()))
            .map(str::to_string)
            .unwrap_or(message);
        (self.filename().to_string(), self.line(), message)
    }
}

fn truncate_lexeme(lexeme: &str) -> String {
    match lexeme.char_indices().nth(MAX_DIAGNOSTIC_LEXEME) {
        Some((cut, _)) => format!("{}...", &lexeme[..cut]),
        None => lexeme.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pos(line: u32) -> SourcePosition {
        SourcePosition::new("t.rv", line)
    }

    #[test]
    fn test_constructors_pick_variant() {
        let err = LexerError::at(LexerErrorKind::MalformedNumber, pos(2), Span::new(0, 3), "1.x");
        assert_matches!(err, LexerError::MalformedNumber { ref lexeme, .. } if lexeme == "1.x");
        assert_eq!(err.kind(), LexerErrorKind::MalformedNumber);
        assert_eq!(err.line(), 2);
        assert_eq!(err.to_string(), "t.rv:2: malformed number '1.x'");

        let err = LexerError::too_large(
            LexerErrorKind::StringTooLarge,
            pos(1),
            Span::new(0, 10),
            "\"aaaaaaaa\"",
            10,
            4,
        );
        assert_matches!(err, LexerError::StringTooLarge { length: 10, limit: 4, .. });
    }

    #[test]
    fn test_constructors_keep_every_kind() {
        let plain = [
            LexerErrorKind::UnrecognizedCharacter,
            LexerErrorKind::UnterminatedString,
            LexerErrorKind::MalformedNumber,
            LexerErrorKind::InvalidEscapeSequence,
            LexerErrorKind::UnterminatedComment,
        ];
        for kind in plain {
            assert_eq!(LexerError::at(kind, pos(1), Span::new(0, 1), "x").kind(), kind);
        }

        let sized = [
            LexerErrorKind::IdentifierTooLong,
            LexerErrorKind::StringTooLarge,
            LexerErrorKind::CommentTooLong,
        ];
        for kind in sized {
            let err = LexerError::too_large(kind, pos(1), Span::new(0, 1), "x", 9, 4);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    #[should_panic(expected = "identifier_too_long needs a length and limit")]
    fn test_size_kind_without_size_is_rejected() {
        LexerError::at(LexerErrorKind::IdentifierTooLong, pos(1), Span::new(0, 1), "x");
    }

    #[test]
    #[should_panic(expected = "malformed_number carries no size")]
    fn test_plain_kind_with_size_is_rejected() {
        LexerError::too_large(LexerErrorKind::MalformedNumber, pos(1), Span::new(0, 1), "x", 9, 4);
    }

    #[test]
    fn test_codes_are_recoverable() {
        let err = LexerError::at(LexerErrorKind::UnrecognizedCharacter, pos(1), Span::new(0, 1), "@");
        assert_eq!(err.error_code().as_str(), "E020");
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_triple(),
            ("t.rv".to_string(), 1, "unrecognized character '@'".to_string())
        );
    }

    #[test]
    fn test_long_lexemes_are_truncated() {
        let long = "x".repeat(MAX_DIAGNOSTIC_LEXEME + 20);
        let err = LexerError::at(LexerErrorKind::UnterminatedString, pos(1), Span::new(0, long.len()), &long);
        assert_eq!(err.lexeme().len(), MAX_DIAGNOSTIC_LEXEME + 3);
        assert!(err.lexeme().ends_with("..."));
        assert_eq!(err.span().len(), long.len());
    }

    #[test]
    fn test_json_shape() {
        let err = LexerError::at(LexerErrorKind::UnterminatedString, pos(3), Span::new(4, 8), "\"abc");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "unterminated_string");
        assert_eq!(json["position"]["line"], 3);
        assert_eq!(json["lexeme"], "\"abc");
    }
}
