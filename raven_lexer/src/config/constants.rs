//! Fixed lexical constants that are not part of the TOML profiles.

/// First numeric kind available to external recognizers
/// EXTENSION: kinds below this value belong to the core token table
pub const EXTERNAL_KIND_BASE: u32 = 1001;

/// Source file extension picked up by directory discovery
pub const SOURCE_FILE_EXTENSION: &str = "rv";

/// Default line comment prefix
pub const DEFAULT_LINE_COMMENT: &str = "#";

/// Characters that open (and close) a string literal
pub const STRING_QUOTES: [char; 2] = ['"', '\''];

/// Horizontal whitespace skipped between lexemes
/// `\r` is included so CRLF sources yield the same tokens as LF sources
pub const HORIZONTAL_WHITESPACE: [char; 5] = [' ', '\t', '\r', '\x0C', '\x0B'];

/// Line terminator
pub const LINE_TERMINATOR: char = '\n';

/// Lexeme text kept in diagnostics before truncation
/// RESOURCE: a runaway literal should not be copied whole into every report
pub const MAX_DIAGNOSTIC_LEXEME: usize = 80;
