//! Lexical front end for the Raven compiler
//!
//! Turns Raven source text into a stream of classified tokens: numbers,
//! strings, keywords, words, operators and line separators, each carrying the
//! file and line it came from. Malformed input produces diagnostics rather
//! than aborting, and every stream ends in exactly one `end` token.
//!
//! ```ignore
//! let stream = raven_lexer::lexical::tokenize("main.rv", "var x = 1\n");
//! for token in &stream {
//!     println!("{} {}", token.line(), token.kind());
//! }
//! ```

#[macro_use]
pub mod logging;

pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use lexical::{
    tokenize, ExternalRecognizer, LexerError, LexicalAnalysisError, LexicalAnalyzer, Scanner,
};
pub use tokens::{Token, TokenKind, TokenStream};
