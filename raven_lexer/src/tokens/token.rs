//! Token data model
//!
//! A `Token` pairs a closed `TokenKind` with the position of its lexeme and a
//! payload whose shape is fixed by the kind. Tokens are built only through
//! `Token::new`, which refuses a payload that does not fit the kind, so a
//! number token always carries a number and an operator never carries text.
use crate::config::constants::EXTERNAL_KIND_BASE;
use crate::grammar::keywords::Keyword;
use crate::utils::{SourcePosition, Span};
use serde::{Serialize, Serializer};
use std::fmt;

/// Token kind supplied by an external recognizer; always `>= 1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalKind(u32);

impl ExternalKind {
    /// `None` for codes inside the core range
    pub const fn new(code: u32) -> Option<Self> {
        if code >= EXTERNAL_KIND_BASE {
            Some(Self(code))
        } else {
            None
        }
    }

    pub const fn code(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ExternalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every kind the core scanner can produce, plus the open external range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,

    // Assignment
    Assignment,
    AssignmentAdd,
    AssignmentSubtract,
    AssignmentMultiply,
    AssignmentDivide,
    AssignmentModulo,
    AssignmentBitOr,
    AssignmentBitAnd,
    AssignmentBitShiftLeft,
    AssignmentBitShiftRight,

    // Structural
    LeftParenthesis,
    RightParenthesis,
    LeftSquareBrace,
    RightSquareBrace,
    LeftCurlyBrace,
    RightCurlyBrace,
    Dot,
    Comma,
    Colon,

    // Operators
    BitXor,
    BitAnd,
    BitShiftLeft,
    BitShiftRight,
    LogicalOr,
    LogicalAnd,
    LogicalNot,
    Equal,
    NotEqual,
    EqualLessThan,
    EqualGreaterThan,
    LessThan,
    GreaterThan,
    ApproxEqual,
    ApproxNotEqual,
    Plus,
    Minus,
    Star,
    Percent,
    Exponent,
    Slash,
    Pipe,
    Tilde,
    Range,
    AssignmentBitXor,

    Keyword(Keyword),

    // Separators and sentinel
    Newline,
    Semicolon,
    End,

    /// Non-keyword word; the spelling is the text payload
    Word,

    External(ExternalKind),
}

/// Broad grouping of kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Literal,
    Assignment,
    Structural,
    Operator,
    Keyword,
    Separator,
    End,
    Word,
    External,
}

/// Payload variant a kind requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Empty,
    Numeric,
    Text,
    /// External kinds choose their own payload
    Any,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayloadShape::Empty => "no payload",
            PayloadShape::Numeric => "a numeric payload",
            PayloadShape::Text => "a text payload",
            PayloadShape::Any => "any payload",
        })
    }
}

use TokenKind::*;

/// Core kinds indexed by numeric code
#[rustfmt::skip]
const CORE_KINDS: [TokenKind; 68] = [
    Number, String,
    Assignment, AssignmentAdd, AssignmentSubtract, AssignmentMultiply, AssignmentDivide,
    AssignmentModulo, AssignmentBitOr, AssignmentBitAnd, AssignmentBitShiftLeft,
    AssignmentBitShiftRight,
    LeftParenthesis, RightParenthesis, LeftSquareBrace, RightSquareBrace, LeftCurlyBrace,
    RightCurlyBrace, Dot, Comma, Colon,
    BitXor, BitAnd, BitShiftLeft, BitShiftRight, LogicalOr, LogicalAnd, LogicalNot, Equal,
    NotEqual, EqualLessThan, EqualGreaterThan, LessThan, GreaterThan, ApproxEqual,
    ApproxNotEqual, Plus, Minus, Star, Percent, Exponent, Slash, Pipe, Tilde, Range,
    AssignmentBitXor,
    Keyword(Keyword::Var), Keyword(Keyword::Const), Keyword(Keyword::Return),
    Keyword(Keyword::If), Keyword(Keyword::Else), Keyword(Keyword::While),
    Keyword(Keyword::Do), Keyword(Keyword::For), Keyword(Keyword::Break),
    Keyword(Keyword::Continue), Keyword(Keyword::Switch), Keyword(Keyword::Case),
    Keyword(Keyword::Use), Keyword(Keyword::Function), Keyword(Keyword::Class),
    Keyword(Keyword::Private), Keyword(Keyword::Public), Keyword(Keyword::Object),
    Newline, Semicolon, End,
    Word,
];

const FIRST_KEYWORD_CODE: u32 = 46;

impl TokenKind {
    /// Stable numeric code: token-table order for core kinds, the raw
    /// value (>= 1001) for external ones
    pub fn code(self) -> u32 {
        match self {
            Keyword(keyword) => FIRST_KEYWORD_CODE + keyword.index() as u32,
            External(external) => external.code(),
            Newline => 64,
            Semicolon => 65,
            End => 66,
            Word => 67,
            fixed => CORE_KINDS[..FIRST_KEYWORD_CODE as usize]
                .iter()
                .position(|k| *k == fixed)
                .map(|i| i as u32)
                .unwrap_or(u32::MAX),
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match ExternalKind::new(code) {
            Some(external) => Some(External(external)),
            None => CORE_KINDS.get(code as usize).copied(),
        }
    }

    /// Every core kind in code order
    pub fn core_kinds() -> &'static [TokenKind] {
        &CORE_KINDS
    }

    /// Snake-case name used in diagnostics and JSON
    pub fn name(self) -> &'static str {
        match self {
            Number => "number",
            String => "string",
            Assignment => "assignment",
            AssignmentAdd => "assignment_add",
            AssignmentSubtract => "assignment_subtract",
            AssignmentMultiply => "assignment_multiply",
            AssignmentDivide => "assignment_divide",
            AssignmentModulo => "assignment_modulo",
            AssignmentBitOr => "assignment_bit_or",
            AssignmentBitAnd => "assignment_bit_and",
            AssignmentBitShiftLeft => "assignment_bit_shift_left",
            AssignmentBitShiftRight => "assignment_bit_shift_right",
            LeftParenthesis => "left_parenthesis",
            RightParenthesis => "right_parenthesis",
            LeftSquareBrace => "left_square_brace",
            RightSquareBrace => "right_square_brace",
            LeftCurlyBrace => "left_curly_brace",
            RightCurlyBrace => "right_curly_brace",
            Dot => "dot",
            Comma => "comma",
            Colon => "colon",
            BitXor => "bit_xor",
            BitAnd => "bit_and",
            BitShiftLeft => "bit_shift_left",
            BitShiftRight => "bit_shift_right",
            LogicalOr => "logical_or",
            LogicalAnd => "logical_and",
            LogicalNot => "logical_not",
            Equal => "equal",
            NotEqual => "not_equal",
            EqualLessThan => "equal_less_than",
            EqualGreaterThan => "equal_greater_than",
            LessThan => "less_than",
            GreaterThan => "greater_than",
            ApproxEqual => "approx_equal",
            ApproxNotEqual => "approx_notequal",
            Plus => "plus",
            Minus => "minus",
            Star => "star",
            Percent => "percent",
            Exponent => "exponent",
            Slash => "slash",
            Pipe => "pipe",
            Tilde => "tilde",
            Range => "range",
            AssignmentBitXor => "assignment_bit_xor",
            Keyword(keyword) => keyword.token_name(),
            Newline => "newline",
            Semicolon => "semicolon",
            End => "end",
            Word => "word",
            External(_) => "external",
        }
    }

    /// Fixed spelling, for kinds that have one
    pub fn lexeme(self) -> Option<&'static str> {
        let spelling = match self {
            Assignment => "=",
            AssignmentAdd => "+=",
            AssignmentSubtract => "-=",
            AssignmentMultiply => "*=",
            AssignmentDivide => "/=",
            AssignmentModulo => "%=",
            AssignmentBitOr => "|=",
            AssignmentBitAnd => "&=",
            AssignmentBitShiftLeft => "<<=",
            AssignmentBitShiftRight => ">>=",
            LeftParenthesis => "(",
            RightParenthesis => ")",
            LeftSquareBrace => "[",
            RightSquareBrace => "]",
            LeftCurlyBrace => "{",
            RightCurlyBrace => "}",
            Dot => ".",
            Comma => ",",
            Colon => ":",
            BitXor => "^",
            BitAnd => "&",
            BitShiftLeft => "<<",
            BitShiftRight => ">>",
            LogicalOr => "||",
            LogicalAnd => "&&",
            LogicalNot => "!",
            Equal => "==",
            NotEqual => "!=",
            EqualLessThan => "<=",
            EqualGreaterThan => ">=",
            LessThan => "<",
            GreaterThan => ">",
            ApproxEqual => "~=",
            ApproxNotEqual => "!~=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Percent => "%",
            Exponent => "**",
            Slash => "/",
            Pipe => "|",
            Tilde => "~",
            Range => "...",
            AssignmentBitXor => "^=",
            Semicolon => ";",
            Keyword(keyword) => keyword.as_str(),
            Number | String | Newline | End | Word | External(_) => return None,
        };
        Some(spelling)
    }

    pub fn category(self) -> TokenCategory {
        match self {
            Number | String => TokenCategory::Literal,
            Assignment
            | AssignmentAdd
            | AssignmentSubtract
            | AssignmentMultiply
            | AssignmentDivide
            | AssignmentModulo
            | AssignmentBitOr
            | AssignmentBitAnd
            | AssignmentBitShiftLeft
            | AssignmentBitShiftRight
            | AssignmentBitXor => TokenCategory::Assignment,
            LeftParenthesis | RightParenthesis | LeftSquareBrace | RightSquareBrace
            | LeftCurlyBrace | RightCurlyBrace | Dot | Comma | Colon => TokenCategory::Structural,
            Keyword(_) => TokenCategory::Keyword,
            Newline | Semicolon => TokenCategory::Separator,
            End => TokenCategory::End,
            Word => TokenCategory::Word,
            External(_) => TokenCategory::External,
            _ => TokenCategory::Operator,
        }
    }

    pub fn payload_shape(self) -> PayloadShape {
        match self {
            Number => PayloadShape::Numeric,
            String | Word => PayloadShape::Text,
            External(_) => PayloadShape::Any,
            _ => PayloadShape::Empty,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, Keyword(_))
    }

    pub fn is_end(self) -> bool {
        self == End
    }

    /// Newlines only separate statements; parsers usually skip them elsewhere
    pub fn is_significant(self) -> bool {
        self != Newline
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            External(external) => write!(f, "external({})", external),
            kind => f.write_str(kind.name()),
        }
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decoded literal value carried by a token
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    #[default]
    None,
    Number(f64),
    Text(std::string::String),
}

impl Payload {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Payload::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Payload::None => "no payload",
            Payload::Number(_) => "a numeric payload",
            Payload::Text(_) => "a text payload",
        }
    }

    fn fits(&self, shape: PayloadShape) -> bool {
        matches!(
            (shape, self),
            (PayloadShape::Any, _)
                | (PayloadShape::Empty, Payload::None)
                | (PayloadShape::Numeric, Payload::Number(_))
                | (PayloadShape::Text, Payload::Text(_))
        )
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => Ok(()),
            Payload::Number(value) => write!(f, "{}", value),
            Payload::Text(text) => write!(f, "{:?}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenError {
    #[error("{kind} token requires {expected}, got {found}")]
    PayloadMismatch {
        kind: TokenKind,
        expected: PayloadShape,
        found: &'static str,
    },
}

impl TokenError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::lexical::PAYLOAD_MISMATCH
    }
}

/// One recognized lexeme. Immutable once built.
///
/// A token belongs to the `TokenStream` that scanned it and is reached only
/// by reference or index into that stream. It is neither `Clone` nor
/// `Copy`, so it cannot be duplicated or moved into another stream:
///
/// ```compile_fail
/// let stream = raven_lexer::lexical::tokenize("a.rv", "x");
/// let copy: raven_lexer::Token = stream.tokens()[0].clone();
/// ```
#[derive(Debug, PartialEq, Serialize)]
pub struct Token {
    kind: TokenKind,
    position: SourcePosition,
    payload: Payload,
    span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        position: SourcePosition,
        payload: Payload,
        span: Span,
    ) -> Result<Self, TokenError> {
        let expected = kind.payload_shape();
        if !payload.fits(expected) {
            return Err(TokenError::PayloadMismatch {
                kind,
                expected,
                found: payload.variant_name(),
            });
        }
        Ok(Self {
            kind,
            position,
            payload,
            span,
        })
    }

    /// Payload-free token; only for kinds whose shape is `Empty`
    pub(crate) fn bare(kind: TokenKind, position: SourcePosition, span: Span) -> Self {
        debug_assert_eq!(kind.payload_shape(), PayloadShape::Empty);
        Self {
            kind,
            position,
            payload: Payload::None,
            span,
        }
    }

    pub(crate) fn number(value: f64, position: SourcePosition, span: Span) -> Self {
        Self {
            kind: Number,
            position,
            payload: Payload::Number(value),
            span,
        }
    }

    pub(crate) fn text(
        kind: TokenKind,
        text: std::string::String,
        position: SourcePosition,
        span: Span,
    ) -> Self {
        debug_assert_eq!(kind.payload_shape(), PayloadShape::Text);
        Self {
            kind,
            position,
            payload: Payload::Text(text),
            span,
        }
    }

    pub(crate) fn external(
        kind: ExternalKind,
        payload: Payload,
        position: SourcePosition,
        span: Span,
    ) -> Self {
        Self {
            kind: External(kind),
            position,
            payload,
            span,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn position(&self) -> &SourcePosition {
        &self.position
    }

    pub fn filename(&self) -> &str {
        self.position.filename()
    }

    pub fn line(&self) -> u32 {
        self.position.line()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Byte range of the lexeme in the source
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            Payload::None => write!(f, "{}", self.kind),
            ref payload => write!(f, "{}({})", self.kind, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pos() -> SourcePosition {
        SourcePosition::new("t.rv", 1)
    }

    #[test]
    fn test_codes_follow_token_table() {
        assert_eq!(Number.code(), 0);
        assert_eq!(String.code(), 1);
        assert_eq!(Assignment.code(), 2);
        assert_eq!(AssignmentBitShiftRight.code(), 11);
        assert_eq!(LeftParenthesis.code(), 12);
        assert_eq!(AssignmentBitXor.code(), 45);
        assert_eq!(Keyword(Keyword::Var).code(), 46);
        assert_eq!(Keyword(Keyword::Object).code(), 63);
        assert_eq!(Newline.code(), 64);
        assert_eq!(Semicolon.code(), 65);
        assert_eq!(End.code(), 66);
        assert_eq!(Word.code(), 67);
    }

    #[test]
    fn test_from_code_inverts_code() {
        for (index, kind) in TokenKind::core_kinds().iter().enumerate() {
            assert_eq!(kind.code(), index as u32);
            assert_eq!(TokenKind::from_code(index as u32), Some(*kind));
        }
        assert_eq!(TokenKind::from_code(68), None);
        assert_eq!(TokenKind::from_code(1000), None);
        assert_matches!(TokenKind::from_code(1001), Some(External(k)) if k.code() == 1001);
    }

    #[test]
    fn test_external_kind_range() {
        assert!(ExternalKind::new(1000).is_none());
        assert!(ExternalKind::new(0).is_none());
        assert_eq!(ExternalKind::new(4242).map(ExternalKind::code), Some(4242));
    }

    #[test]
    fn test_names_and_lexemes() {
        assert_eq!(ApproxNotEqual.name(), "approx_notequal");
        assert_eq!(ApproxNotEqual.lexeme(), Some("!~="));
        assert_eq!(Keyword(Keyword::Return).name(), "k_return");
        assert_eq!(Keyword(Keyword::Return).lexeme(), Some("return"));
        assert_eq!(Number.lexeme(), None);
        assert_eq!(End.to_string(), "end");
        assert_eq!(
            External(ExternalKind::new(1001).unwrap()).to_string(),
            "external(1001)"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(AssignmentBitXor.category(), TokenCategory::Assignment);
        assert_eq!(Range.category(), TokenCategory::Operator);
        assert_eq!(Colon.category(), TokenCategory::Structural);
        assert_eq!(Semicolon.category(), TokenCategory::Separator);
        assert_eq!(Keyword(Keyword::If).category(), TokenCategory::Keyword);
    }

    #[test]
    fn test_payload_must_match_kind() {
        assert!(Token::new(Number, pos(), Payload::Number(5.0), Span::new(0, 1)).is_ok());
        assert!(Token::new(Word, pos(), Payload::Text("x".into()), Span::new(0, 1)).is_ok());

        assert_matches!(
            Token::new(Plus, pos(), Payload::Number(1.0), Span::new(0, 1)),
            Err(TokenError::PayloadMismatch { kind: Plus, expected: PayloadShape::Empty, .. })
        );
        assert_matches!(
            Token::new(String, pos(), Payload::None, Span::new(0, 2)),
            Err(TokenError::PayloadMismatch { expected: PayloadShape::Text, .. })
        );

        let external = External(ExternalKind::new(2000).unwrap());
        assert!(Token::new(external, pos(), Payload::Number(1.0), Span::new(0, 1)).is_ok());
        assert!(Token::new(external, pos(), Payload::None, Span::new(0, 1)).is_ok());
    }

    #[test]
    fn test_token_display_and_json() {
        let token = Token::number(5.0, pos(), Span::new(0, 1));
        assert_eq!(token.to_string(), "number(5)");

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["kind"], "number");
        assert_eq!(json["position"]["line"], 1);
        assert_eq!(json["payload"]["number"], 5.0);
        assert_eq!(json["span"]["start"], 0);
    }
}
