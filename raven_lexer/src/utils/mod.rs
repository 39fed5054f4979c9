//! Shared source-location types for the lexer and its consumers

pub mod span;

pub use span::{SourceMap, SourcePosition, Span};
