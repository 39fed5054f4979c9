//! Extension hook for token kinds numbered 1001 and above
//!
//! Recognizers are consulted only for a character no built-in rule accepts,
//! in registration order. The core scanner never produces an external kind
//! on its own.
use crate::config::compile_time::lexical::MAX_EXTERNAL_RECOGNIZERS;
use crate::tokens::{ExternalKind, Payload};
use std::fmt;
use std::sync::Arc;

/// Match reported by an external recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct Recognized {
    pub kind: ExternalKind,
    /// Characters consumed; a zero here is treated as no match
    pub consumed: usize,
    pub payload: Payload,
}

pub trait ExternalRecognizer: Send + Sync + fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Inspect the unread input and claim a prefix of it
    fn recognize(&self, input: &str) -> Option<Recognized>;
}

/// Recognizes one fixed spelling, e.g. `@` or `$$`
#[derive(Debug, Clone)]
pub struct SpellingRecognizer {
    spelling: String,
    kind: ExternalKind,
}

impl SpellingRecognizer {
    pub fn new(spelling: impl Into<String>, kind: ExternalKind) -> Self {
        Self {
            spelling: spelling.into(),
            kind,
        }
    }
}

impl ExternalRecognizer for SpellingRecognizer {
    fn name(&self) -> &str {
        &self.spelling
    }

    fn recognize(&self, input: &str) -> Option<Recognized> {
        if self.spelling.is_empty() || !input.starts_with(self.spelling.as_str()) {
            return None;
        }
        Some(Recognized {
            kind: self.kind,
            consumed: self.spelling.chars().count(),
            payload: Payload::None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognizerError {
    #[error("Cannot register recognizer '{name}': limit of {limit} reached")]
    TooManyRecognizers { name: String, limit: usize },
}

impl RecognizerError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

/// Ordered recognizer list, cheap to clone across batch workers
#[derive(Debug, Clone, Default)]
pub struct RecognizerSet {
    recognizers: Vec<Arc<dyn ExternalRecognizer>>,
}

impl RecognizerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        recognizer: Arc<dyn ExternalRecognizer>,
    ) -> Result<(), RecognizerError> {
        if self.recognizers.len() >= MAX_EXTERNAL_RECOGNIZERS {
            return Err(RecognizerError::TooManyRecognizers {
                name: recognizer.name().to_string(),
                limit: MAX_EXTERNAL_RECOGNIZERS,
            });
        }
        crate::log_debug!("External recognizer registered",
            "name" => recognizer.name(),
            "index" => self.recognizers.len()
        );
        self.recognizers.push(recognizer);
        Ok(())
    }

    /// First recognizer, in registration order, that claims a non-empty prefix
    pub fn recognize(&self, input: &str) -> Option<Recognized> {
        self.recognizers
            .iter()
            .filter_map(|recognizer| recognizer.recognize(input))
            .find(|recognized| recognized.consumed > 0)
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}
