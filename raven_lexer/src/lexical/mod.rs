//! Lexical analysis for Raven source text
//!
//! [`cursor`] walks characters, [`scanner`] turns them into tokens one at a
//! time, and [`analyzer`] drives a scanner over a whole file with the token
//! ceiling and logging applied. [`recognizer`] is the hook for token kinds
//! outside the core table.

pub mod analyzer;
pub mod cursor;
pub mod error;
pub mod recognizer;
pub mod scanner;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::tokens::{TokenCategory, TokenStream};

pub use analyzer::{LexicalAnalysisError, LexicalAnalyzer, LexicalMetrics};
pub use cursor::Cursor;
pub use error::{LexerError, LexerErrorKind};
pub use recognizer::{
    ExternalRecognizer, Recognized, RecognizerError, RecognizerSet, SpellingRecognizer,
};
pub use scanner::{Scanner, ScannerOptions};

// ============================================================================
// MODULE API
// ============================================================================

/// Scan `source` with default options. No logging, no token ceiling.
pub fn tokenize(filename: &str, source: &str) -> TokenStream {
    tokenize_with_options(filename, source, ScannerOptions::default())
}

pub fn tokenize_with_options(filename: &str, source: &str, options: ScannerOptions) -> TokenStream {
    TokenStream::scan(Scanner::with_options(Cursor::new(filename, source), options))
}

/// Tokenize a loaded file with the environment's preferences
pub fn tokenize_file_result(
    file_result: &FileProcessingResult,
) -> Result<TokenStream, LexicalAnalysisError> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}

pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexicalAnalysisError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize_file_result(file_result)
}

/// Load and tokenize a file in one step
pub fn tokenize_file(path: &str) -> Result<TokenStream, LexicalAnalysisError> {
    let file_result = crate::file_processor::process_file(path)?;
    tokenize_file_result(&file_result)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

const LEXICAL_CODES: [crate::logging::Code; 10] = [
    crate::logging::codes::lexical::UNRECOGNIZED_CHARACTER,
    crate::logging::codes::lexical::UNTERMINATED_STRING,
    crate::logging::codes::lexical::MALFORMED_NUMBER,
    crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
    crate::logging::codes::lexical::STRING_TOO_LARGE,
    crate::logging::codes::lexical::INVALID_ESCAPE_SEQUENCE,
    crate::logging::codes::lexical::COMMENT_TOO_LONG,
    crate::logging::codes::lexical::TOO_MANY_TOKENS,
    crate::logging::codes::lexical::UNTERMINATED_COMMENT,
    crate::logging::codes::lexical::SCAN_AFTER_END,
];

/// Check the lexical error codes and build the keyword table before any
/// file is scanned
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    let keywords = crate::grammar::init_keyword_table();
    let operators = crate::grammar::operators::operator_kinds().len();

    crate::log_debug!("Lexical tables initialized",
        "keywords" => keywords,
        "operators" => operators,
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

/// Sanity-check the compiled-in limits
pub fn validate_tokenization() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        let description = crate::logging::codes::get_description(code.as_str());
        if description == "Unknown error" {
            return Err(format!(
                "Lexical error code {} has no description",
                code.as_str()
            ));
        }
    }

    if MAX_STRING_SIZE == 0 {
        return Err("MAX_STRING_SIZE cannot be zero".to_string());
    }
    if MAX_IDENTIFIER_LENGTH == 0 {
        return Err("MAX_IDENTIFIER_LENGTH cannot be zero".to_string());
    }
    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }
    if MAX_COMMENT_LENGTH == 0 {
        return Err("MAX_COMMENT_LENGTH cannot be zero".to_string());
    }

    if MAX_STRING_SIZE > 100_000_000 {
        return Err("MAX_STRING_SIZE exceeds reasonable limit".to_string());
    }
    if MAX_TOKEN_COUNT > 10_000_000 {
        return Err("MAX_TOKEN_COUNT exceeds reasonable limit".to_string());
    }

    Ok(())
}

pub fn get_security_limits() -> SecurityLimits {
    SecurityLimits {
        max_string_size: MAX_STRING_SIZE,
        max_identifier_length: MAX_IDENTIFIER_LENGTH,
        max_comment_length: MAX_COMMENT_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
        max_external_recognizers: MAX_EXTERNAL_RECOGNIZERS,
    }
}

/// Compile-time lexical limits, for reporting
#[derive(Debug, Clone, serde::Serialize)]
pub struct SecurityLimits {
    pub max_string_size: usize,
    pub max_identifier_length: usize,
    pub max_comment_length: usize,
    pub max_token_count: usize,
    pub max_external_recognizers: usize,
}

impl SecurityLimits {
    /// Conservative bounds a release build is expected to stay under
    pub fn is_conservative(&self) -> bool {
        self.max_string_size <= 10_000_000
            && self.max_identifier_length <= 1000
            && self.max_comment_length <= 100_000
            && self.max_token_count <= 5_000_000
            && self.max_external_recognizers <= 256
    }
}

// ============================================================================
// TOKEN DISTRIBUTION
// ============================================================================

pub fn get_token_counts(token_stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in token_stream {
        counts.total += 1;
        match token.kind().category() {
            TokenCategory::Literal => counts.literals += 1,
            TokenCategory::Keyword => counts.keywords += 1,
            TokenCategory::Word => counts.words += 1,
            TokenCategory::Operator | TokenCategory::Assignment => counts.operators += 1,
            TokenCategory::Structural => counts.structural += 1,
            TokenCategory::Separator => counts.separators += 1,
            TokenCategory::External => counts.external += 1,
            TokenCategory::End => {}
        }
    }

    counts
}

/// Token distribution by category
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCounts {
    pub total: usize,
    pub literals: usize,
    pub keywords: usize,
    pub words: usize,
    pub operators: usize,
    pub structural: usize,
    pub separators: usize,
    pub external: usize,
}

impl TokenCounts {
    /// Everything but separators and the end token
    pub fn significant_tokens(&self) -> usize {
        self.total.saturating_sub(self.separators + 1)
    }

    pub fn has_content(&self) -> bool {
        self.significant_tokens() > 0
    }

    pub fn is_within_security_limits(&self) -> bool {
        self.total <= MAX_TOKEN_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CommentSyntax;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_create_analyzer_with_preferences() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            coalesce_newlines: false,
            ..Default::default()
        };
        let analyzer = create_analyzer_with_preferences(preferences);
        assert!(!analyzer.preferences().collect_detailed_metrics);
        assert!(!analyzer.preferences().coalesce_newlines);
    }

    #[test]
    fn test_init_and_validate() {
        assert!(init_lexical_analysis_logging().is_ok());
        assert!(validate_tokenization().is_ok());
    }

    #[test]
    fn test_security_limits() {
        let limits = get_security_limits();
        assert!(limits.max_string_size > 0);
        assert!(limits.max_identifier_length > 0);
        assert_eq!(limits.max_token_count, MAX_TOKEN_COUNT);

        let tight = SecurityLimits {
            max_string_size: 1024,
            max_identifier_length: 64,
            max_comment_length: 1024,
            max_token_count: 10_000,
            max_external_recognizers: 4,
        };
        assert!(tight.is_conservative());
        assert!(!SecurityLimits {
            max_token_count: 50_000_000,
            ..tight
        }
        .is_conservative());
    }

    #[test]
    fn test_tokenize_plain() {
        let stream = tokenize("t.rv", "while n < 10 { n += 1 }");
        let kinds: Vec<TokenKind> = stream.iter().map(|t| t.kind()).collect();
        assert_eq!(kinds.len(), 10);
        assert_eq!(kinds[1], TokenKind::Word);
        assert_eq!(kinds[2], TokenKind::LessThan);
        assert_eq!(kinds[9], TokenKind::End);
    }

    #[test]
    fn test_tokenize_with_options_without_comments() {
        let options = ScannerOptions::new(CommentSyntax::none());
        let stream = tokenize_with_options("t.rv", "# x", options);
        assert!(stream.has_errors());
        assert_eq!(
            stream.diagnostics()[0].kind(),
            LexerErrorKind::UnrecognizedCharacter
        );
    }

    #[test]
    fn test_token_counts() {
        let stream = tokenize("t.rv", "function f(a) { return a * 2; }\n");
        let counts = get_token_counts(&stream);

        assert_eq!(counts.total, stream.len());
        assert_eq!(counts.keywords, 2);
        assert_eq!(counts.words, 3);
        assert_eq!(counts.literals, 1);
        assert_eq!(counts.operators, 1);
        assert_eq!(counts.structural, 4);
        assert_eq!(counts.separators, 2);
        assert!(counts.has_content());
        assert!(counts.is_within_security_limits());
    }

    #[test]
    fn test_empty_source_counts() {
        let counts = get_token_counts(&tokenize("t.rv", ""));
        assert_eq!(counts.total, 1);
        assert!(!counts.has_content());
    }

    #[test]
    fn test_tokenize_file_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.rv");
        let result = tokenize_file(missing.to_str().unwrap());
        assert_matches!(result, Err(LexicalAnalysisError::File(_)));
    }
}
