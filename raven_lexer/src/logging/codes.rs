//! Error and success codes with their classification metadata
//!
//! Every diagnostic the lexer emits carries one of these codes; severity,
//! recoverability and halt behaviour are looked up here rather than encoded
//! in the error types themselves.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNRECOGNIZED_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const MALFORMED_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const INVALID_ESCAPE_SEQUENCE: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E028");

    // Caller contract violations, never produced by the scanner itself
    pub const SCAN_AFTER_END: Code = Code::new("E029");
    pub const PAYLOAD_MISMATCH: Code = Code::new("E030");
}

pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("B001");
    pub const NO_SOURCE_FILES: Code = Code::new("B002");
    pub const TOO_MANY_FILES: Code = Code::new("B003");
    pub const DIRECTORY_IO_ERROR: Code = Code::new("B004");
    pub const WORKER_FAILURE: Code = Code::new("B005");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const LEXICAL_VALIDATION_PASSED: Code = Code::new("I021");

    pub const BATCH_DISCOVERY_COMPLETE: Code = Code::new("I030");
    pub const BATCH_COMPLETE: Code = Code::new("I031");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

use Severity::{Critical, High, Low, Medium};

#[rustfmt::skip]
const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new("ERR001", "System", Critical, false, true,
        "Critical internal system error", "File a bug report with the failing input"),
    ErrorMetadata::new("ERR002", "System", Critical, false, true,
        "Logging or runtime initialization failed", "Check environment configuration and restart"),
    ErrorMetadata::new("ERR003", "System", High, false, true,
        "Runtime configuration could not be loaded", "Fix the configuration file or RAVEN_* variables"),

    // File processing
    ErrorMetadata::new("E005", "FileProcessing", High, false, true,
        "Source file not found", "Check the path and try again"),
    ErrorMetadata::new("E006", "FileProcessing", Medium, false, true,
        "Source file has the wrong extension", "Rename the file to use the .rv extension"),
    ErrorMetadata::new("E007", "FileProcessing", High, false, true,
        "Source file exceeds the configured size limit", "Split the file or raise max_file_size"),
    ErrorMetadata::new("E008", "FileProcessing", Low, false, true,
        "Source file is empty", "Add source text to the file"),
    ErrorMetadata::new("E009", "FileProcessing", High, false, true,
        "Permission denied reading source file", "Check file permissions"),
    ErrorMetadata::new("E010", "FileProcessing", High, false, true,
        "Source file is not valid UTF-8", "Re-encode the file as UTF-8"),
    ErrorMetadata::new("E011", "FileProcessing", High, false, true,
        "I/O error while reading source file", "Check disk health and retry"),
    ErrorMetadata::new("E012", "FileProcessing", Medium, false, true,
        "Invalid source path", "Provide a path to a regular file"),
    ErrorMetadata::new("E013", "FileProcessing", Medium, false, true,
        "Source file has too many lines", "Split the file or raise max_line_count"),

    // Lexical
    ErrorMetadata::new("E020", "Lexical", Medium, true, false,
        "Unrecognized character", "Remove the character or quote it inside a string"),
    ErrorMetadata::new("E021", "Lexical", Medium, true, false,
        "Unterminated string literal", "Add the closing quote before the end of the line"),
    ErrorMetadata::new("E022", "Lexical", Medium, true, false,
        "Malformed number literal", "Use digits with at most one decimal point followed by digits"),
    ErrorMetadata::new("E023", "Lexical", Medium, true, false,
        "Identifier exceeds maximum length", "Use a shorter name"),
    ErrorMetadata::new("E024", "Lexical", Medium, true, false,
        "String literal exceeds maximum size", "Split the literal"),
    ErrorMetadata::new("E025", "Lexical", Medium, true, false,
        "Invalid escape sequence in string literal", "Use one of \\n \\t \\r \\0 \\\\ \\\" \\'"),
    ErrorMetadata::new("E026", "Lexical", Low, true, false,
        "Comment exceeds maximum length", "Shorten the comment"),
    ErrorMetadata::new("E027", "Lexical", High, false, true,
        "Token count exceeds maximum", "Split the source file"),
    ErrorMetadata::new("E028", "Lexical", Medium, true, false,
        "Unterminated block comment", "Close the block comment"),
    ErrorMetadata::new("E029", "Lexical", Critical, false, true,
        "Token requested after the end-of-input sentinel", "Stop scanning once end has been produced"),
    ErrorMetadata::new("E030", "Lexical", Critical, false, true,
        "Token payload does not match its kind", "Construct tokens through the scanner"),

    // Batch
    ErrorMetadata::new("B001", "Batch", High, false, true,
        "Batch directory not found", "Check the directory path"),
    ErrorMetadata::new("B002", "Batch", Low, false, true,
        "No source files found in directory", "Check the directory contains .rv files"),
    ErrorMetadata::new("B003", "Batch", Medium, false, true,
        "Too many files in batch", "Use --max-files or split the directory"),
    ErrorMetadata::new("B004", "Batch", High, false, true,
        "I/O error during directory traversal", "Check directory permissions"),
    ErrorMetadata::new("B005", "Batch", Critical, false, true,
        "Batch worker thread failed", "Re-run sequentially to isolate the failing file"),

    // Success
    ErrorMetadata::new("I001", "Success", Low, true, false,
        "Operation completed successfully", "None"),
    ErrorMetadata::new("I004", "Success", Low, true, false,
        "System initialization completed", "None"),
    ErrorMetadata::new("I006", "Success", Low, true, false,
        "File processed successfully", "None"),
    ErrorMetadata::new("I007", "Success", Low, true, false,
        "File validation passed", "None"),
    ErrorMetadata::new("I020", "Success", Low, true, false,
        "Tokenization completed", "Hand the token stream to the parser"),
    ErrorMetadata::new("I021", "Success", Low, true, false,
        "Token stream validation passed", "None"),
    ErrorMetadata::new("I030", "Success", Low, true, false,
        "Batch file discovery completed", "None"),
    ErrorMetadata::new("I031", "Success", Low, true, false,
        "Batch processing completed", "None"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        assert_eq!(get_error_registry().len(), REGISTRY_ENTRIES.len());
    }

    #[test]
    fn test_lexical_codes_are_recoverable() {
        for code in [
            lexical::UNRECOGNIZED_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::MALFORMED_NUMBER,
            lexical::INVALID_ESCAPE_SEQUENCE,
        ] {
            assert!(is_recoverable(code.as_str()), "{} should recover", code);
            assert!(!requires_halt(code.as_str()));
            assert_eq!(get_category(code.as_str()), "Lexical");
        }
        assert!(requires_halt(lexical::TOO_MANY_TOKENS.as_str()));
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_action("Z999"), "No specific action available");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(get_error_metadata("Z999").is_none());
    }
}
