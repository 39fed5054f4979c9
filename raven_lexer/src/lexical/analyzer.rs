//! File-aware lexical analysis
//!
//! Wraps the scanner with what a compiler driver needs around it: the token
//! count ceiling, per-file metrics, and logging of every diagnostic under the
//! current file context.

use crate::config::compile_time::lexical::{MAX_IDENTIFIER_LENGTH, MAX_STRING_SIZE, MAX_TOKEN_COUNT};
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::{FileProcessingResult, FileProcessorError};
use crate::lexical::cursor::Cursor;
use crate::lexical::recognizer::RecognizerSet;
use crate::lexical::scanner::{Scanner, ScannerOptions};
use crate::logging::codes;
use crate::tokens::{
    Token, TokenCategory, TokenKind, TokenStream, TokenStreamBuilder, TokenStreamError,
};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Failures that stop analysis of a file. Lexical diagnostics are not among
/// them; they travel with the token stream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexicalAnalysisError {
    #[error(transparent)]
    File(#[from] FileProcessorError),

    #[error("{file}: too many tokens: {count} (max {limit})")]
    TooManyTokens {
        file: String,
        count: usize,
        limit: usize,
    },

    #[error(transparent)]
    Stream(#[from] TokenStreamError),
}

impl LexicalAnalysisError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::File(error) => error.error_code(),
            Self::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            Self::Stream(error) => error.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// Token statistics for one file
#[derive(Debug, Default, Clone, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub number_tokens: usize,
    pub string_tokens: usize,
    pub keyword_tokens: usize,
    pub word_tokens: usize,
    pub operator_tokens: usize,
    pub assignment_tokens: usize,
    pub structural_tokens: usize,
    pub separator_tokens: usize,
    pub external_tokens: usize,
    pub diagnostics: usize,
    pub max_string_length: usize,
    pub max_word_length: usize,
    pub lines_scanned: u32,

    /// Per-kind counts, only with `collect_detailed_metrics`
    pub kind_counts: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        self.lines_scanned = self.lines_scanned.max(token.line());

        match token.kind().category() {
            TokenCategory::Literal if token.is(TokenKind::Number) => self.number_tokens += 1,
            TokenCategory::Literal => {
                self.string_tokens += 1;
                let length = token.payload().as_text().map_or(0, str::len);
                self.record_string_length(length, preferences);
            }
            TokenCategory::Keyword => self.keyword_tokens += 1,
            TokenCategory::Word => {
                self.word_tokens += 1;
                let length = token.payload().as_text().map_or(0, str::len);
                self.max_word_length = self.max_word_length.max(length);
            }
            TokenCategory::Operator => self.operator_tokens += 1,
            TokenCategory::Assignment => self.assignment_tokens += 1,
            TokenCategory::Structural => self.structural_tokens += 1,
            TokenCategory::Separator => self.separator_tokens += 1,
            TokenCategory::External => self.external_tokens += 1,
            TokenCategory::End => {}
        }

        if preferences.collect_detailed_metrics {
            *self
                .kind_counts
                .entry(token.kind().to_string())
                .or_insert(0) += 1;
        }
    }

    fn record_string_length(&mut self, length: usize, preferences: &LexicalPreferences) {
        self.max_string_length = self.max_string_length.max(length);

        if preferences.log_string_statistics {
            log_debug!("String literal processed",
                "length" => length,
                "max_so_far" => self.max_string_length
            );
        }
    }
}

/// Lexical analyzer with global logging integration and compile-time limits
#[derive(Debug)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
    recognizers: RecognizerSet,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
            recognizers: RecognizerSet::new(),
        }
    }

    /// External recognizers handed to every scanner this analyzer creates
    pub fn with_recognizers(mut self, recognizers: RecognizerSet) -> Self {
        self.recognizers = recognizers;
        self
    }

    /// Tokenize a loaded file, attributing tokens to its canonical path
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexicalAnalysisError> {
        log_debug!("Starting lexical analysis",
            "file" => file_result.metadata.path.display(),
            "char_count" => file_result.char_count(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size
        );
        self.tokenize_source(&file_result.display_name(), &file_result.source)
    }

    /// Tokenize text that did not come from the file processor
    pub fn tokenize_source(
        &mut self,
        filename: &str,
        source: &str,
    ) -> Result<TokenStream, LexicalAnalysisError> {
        self.metrics = LexicalMetrics::default();
        let started = Instant::now();

        let options = ScannerOptions::from_preferences(&self.preferences);
        let scanner = Scanner::with_options(Cursor::new(filename, source), options)
            .with_recognizers(self.recognizers.clone());
        let mut builder = TokenStreamBuilder::new(scanner);

        while !builder.is_ended() {
            // SECURITY: the one condition that abandons a file
            if builder.len() >= MAX_TOKEN_COUNT {
                let error = LexicalAnalysisError::TooManyTokens {
                    file: filename.to_string(),
                    count: builder.len(),
                    limit: MAX_TOKEN_COUNT,
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    "file" => filename,
                    "token_count" => builder.len(),
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }

            let token = builder.scan_next()?;
            self.metrics.record_token(token, &self.preferences);
        }

        let stream = builder.finish();
        self.metrics.diagnostics = stream.diagnostics().len();

        if self.preferences.log_diagnostics {
            for diagnostic in stream.diagnostics() {
                let (_, _, message) = diagnostic.to_triple();
                log_error!(diagnostic.error_code(), &message,
                    position = diagnostic.position().clone(),
                    "kind" => diagnostic.kind(),
                    "lexeme" => diagnostic.lexeme()
                );
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed",
            "file" => filename,
            "token_count" => stream.len(),
            "keywords" => self.metrics.keyword_tokens,
            "words" => self.metrics.word_tokens,
            "operators" => self.metrics.operator_tokens,
            "diagnostics" => self.metrics.diagnostics,
            "max_string_length" => self.metrics.max_string_length,
            "duration_ms" => format!("{:.2}", elapsed_ms),
            "limits" => format!("tokens:{}, strings:{}, identifiers:{}",
                MAX_TOKEN_COUNT, MAX_STRING_SIZE, MAX_IDENTIFIER_LENGTH)
        );

        Ok(stream)
    }

    /// Metrics of the most recent run
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::CommentSyntax;
    use crate::file_processor::FileProcessor;
    use crate::lexical::recognizer::SpellingRecognizer;
    use crate::tokens::ExternalKind;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn preferences() -> LexicalPreferences {
        LexicalPreferences {
            coalesce_newlines: true,
            comments: CommentSyntax {
                line: vec!["#".to_string()],
                block: None,
            },
            collect_detailed_metrics: true,
            log_diagnostics: true,
            log_string_statistics: false,
        }
    }

    #[test]
    fn test_tokenize_source_records_metrics() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        let stream = analyzer
            .tokenize_source("m.rv", "var name = \"raven\"\nname += 2 # add\n")
            .unwrap();

        assert!(!stream.has_errors());
        let metrics = analyzer.metrics();
        assert_eq!(metrics.total_tokens, stream.len());
        assert_eq!(metrics.keyword_tokens, 1);
        assert_eq!(metrics.word_tokens, 2);
        assert_eq!(metrics.assignment_tokens, 2);
        assert_eq!(metrics.number_tokens, 1);
        assert_eq!(metrics.string_tokens, 1);
        assert_eq!(metrics.separator_tokens, 2);
        assert_eq!(metrics.max_string_length, 5);
        assert_eq!(metrics.max_word_length, 4);
        assert_eq!(metrics.kind_counts.get("word"), Some(&2));
        assert_eq!(metrics.kind_counts.get("end"), Some(&1));
    }

    #[test]
    fn test_diagnostics_are_not_fatal() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        let stream = analyzer.tokenize_source("m.rv", "a ` b \"c").unwrap();
        assert_eq!(stream.diagnostics().len(), 2);
        assert_eq!(analyzer.metrics().diagnostics, 2);
        assert!(stream.tokens().last().unwrap().is(TokenKind::End));
    }

    #[test]
    fn test_detailed_metrics_toggle() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            collect_detailed_metrics: false,
            ..preferences()
        });
        analyzer.tokenize_source("m.rv", "1 + 2").unwrap();
        assert!(analyzer.metrics().kind_counts.is_empty());
        assert_eq!(analyzer.metrics().operator_tokens, 1);
    }

    #[test]
    fn test_recognizers_reach_the_scanner() {
        let mut recognizers = RecognizerSet::new();
        recognizers
            .register(Arc::new(SpellingRecognizer::new(
                "$",
                ExternalKind::new(1001).unwrap(),
            )))
            .unwrap();
        let mut analyzer =
            LexicalAnalyzer::with_preferences(preferences()).with_recognizers(recognizers);
        let stream = analyzer.tokenize_source("m.rv", "$x").unwrap();
        assert_eq!(stream.tokens()[0].kind().code(), 1001);
        assert_eq!(analyzer.metrics().external_tokens, 1);
    }

    #[test]
    fn test_tokenize_file_result_uses_path() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("unit.rv");
        std::fs::write(&file_path, "if x {\n  return 1\n}\n").unwrap();

        let file_result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences());
        let stream = analyzer.tokenize_file_result(&file_result).unwrap();

        let first = &stream.tokens()[0];
        assert!(first.filename().ends_with("unit.rv"));
        assert_eq!(analyzer.metrics().lines_scanned, 4);
    }

    #[test]
    fn test_error_codes() {
        let error = LexicalAnalysisError::TooManyTokens {
            file: "m.rv".to_string(),
            count: 10,
            limit: 10,
        };
        assert_eq!(error.error_code().as_str(), "E027");
        assert!(error.requires_halt());

        let error: LexicalAnalysisError = FileProcessorError::EmptyFile.into();
        assert_matches!(error, LexicalAnalysisError::File(FileProcessorError::EmptyFile));
        assert_eq!(error.error_code().as_str(), "E008");
    }
}
