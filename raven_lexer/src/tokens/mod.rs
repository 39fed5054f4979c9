//! Token model and token stream
//!
//! A scan turns one source buffer into a `TokenStream`: an ordered arena of
//! `Token`s closed by a single `end` token, plus the lexical diagnostics met
//! along the way.
//!
//! ## Token kinds
//!
//! - **Literals**: `number` (numeric payload) and `string` (decoded text payload)
//! - **Assignment**: `=` and the compound forms `+=` through `>>=` and `^=`
//! - **Structural**: parentheses, brackets, braces, `.`, `,`, `:`
//! - **Operators**: arithmetic, bitwise, logical, comparison, `~=`, `!~=`, `...`
//! - **Keywords**: the reserved words of `grammar::keywords`
//! - **Separators**: `newline` and `;`
//! - **Words**: any other identifier spelling, carried as text
//! - **External**: kinds numbered from 1001, produced only by registered recognizers
//!
//! Every kind has a stable numeric code and a snake-case name; both appear in
//! the JSON output of `raven-lex`.

pub mod token;
pub mod token_stream;

pub use token::{
    ExternalKind, Payload, PayloadShape, Token, TokenCategory, TokenError, TokenKind,
};
pub use token_stream::{TokenStream, TokenStreamBuilder, TokenStreamError};

pub use crate::utils::{SourcePosition, Span};
