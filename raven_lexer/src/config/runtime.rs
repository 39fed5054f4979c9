// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use super::constants::DEFAULT_LINE_COMMENT;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without the .rv extension
    pub require_rv_extension: bool,

    /// Whether to log size and timing for every file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_rv_extension: env_or(env_vars::REQUIRE_RV_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

/// Comment syntax recognized by the scanner's skip step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSyntax {
    /// Prefixes that start a comment running to the end of the line
    pub line: Vec<String>,

    /// Optional opening and closing delimiters of a block comment
    pub block: Option<(String, String)>,
}

impl CommentSyntax {
    /// No comments at all; every character is significant
    pub fn none() -> Self {
        Self {
            line: Vec::new(),
            block: None,
        }
    }

    /// Parse `RAVEN_LEXICAL_LINE_COMMENTS` style lists: `#,//`
    pub fn parse_line_prefixes(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse `RAVEN_LEXICAL_BLOCK_COMMENT` style pairs: `/*,*/`
    pub fn parse_block_pair(value: &str) -> Option<(String, String)> {
        let (open, close) = value.split_once(',')?;
        let (open, close) = (open.trim(), close.trim());
        if open.is_empty() || close.is_empty() {
            return None;
        }
        Some((open.to_string(), close.to_string()))
    }
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self {
            line: env::var(env_vars::LEXICAL_LINE_COMMENTS)
                .map(|v| Self::parse_line_prefixes(&v))
                .unwrap_or_else(|_| vec![DEFAULT_LINE_COMMENT.to_string()]),
            block: env::var(env_vars::LEXICAL_BLOCK_COMMENT)
                .ok()
                .and_then(|v| Self::parse_block_pair(&v)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Collapse runs of blank lines into a single newline token
    pub coalesce_newlines: bool,

    /// Comment delimiters
    pub comments: CommentSyntax,

    /// Whether to collect per-kind token metrics
    pub collect_detailed_metrics: bool,

    /// Whether to log every diagnostic as it is produced
    pub log_diagnostics: bool,

    /// Whether to log string length statistics
    pub log_string_statistics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            coalesce_newlines: env_or(env_vars::LEXICAL_COALESCE_NEWLINES, true),
            comments: CommentSyntax::default(),
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            log_diagnostics: env_or(env_vars::LEXICAL_LOG_DIAGNOSTICS, true),
            log_string_statistics: env_or(env_vars::LEXICAL_LOG_STRING_STATS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for directory runs (capped by MAX_WORKER_THREADS)
    pub worker_threads: usize,

    /// Descend into sub-directories
    pub recursive: bool,

    /// Stop scheduling files after the first failure
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            worker_threads: env_or(env_vars::BATCH_WORKER_THREADS, 4),
            recursive: env_or(env_vars::BATCH_RECURSIVE, true),
            fail_fast: env_or(env_vars::BATCH_FAIL_FAST, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML; missing keys fall back to environment defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_RV_EXTENSION: &str = "RAVEN_REQUIRE_RV_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "RAVEN_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_COALESCE_NEWLINES: &str = "RAVEN_LEXICAL_COALESCE_NEWLINES";
    pub const LEXICAL_LINE_COMMENTS: &str = "RAVEN_LEXICAL_LINE_COMMENTS";
    pub const LEXICAL_BLOCK_COMMENT: &str = "RAVEN_LEXICAL_BLOCK_COMMENT";
    pub const LEXICAL_DETAILED_METRICS: &str = "RAVEN_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_LOG_DIAGNOSTICS: &str = "RAVEN_LEXICAL_LOG_DIAGNOSTICS";
    pub const LEXICAL_LOG_STRING_STATS: &str = "RAVEN_LEXICAL_LOG_STRING_STATS";

    // Batch
    pub const BATCH_WORKER_THREADS: &str = "RAVEN_BATCH_WORKER_THREADS";
    pub const BATCH_RECURSIVE: &str = "RAVEN_BATCH_RECURSIVE";
    pub const BATCH_FAIL_FAST: &str = "RAVEN_BATCH_FAIL_FAST";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "RAVEN_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "RAVEN_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "RAVEN_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "RAVEN_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "RAVEN_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_comment_syntax_parsing() {
        assert_eq!(
            CommentSyntax::parse_line_prefixes("#, //"),
            vec!["#".to_string(), "//".to_string()]
        );
        assert!(CommentSyntax::parse_line_prefixes(" , ").is_empty());
        assert_eq!(
            CommentSyntax::parse_block_pair("/*,*/"),
            Some(("/*".to_string(), "*/".to_string()))
        );
        assert_eq!(CommentSyntax::parse_block_pair("/*"), None);
        assert_eq!(CommentSyntax::parse_block_pair(",*/"), None);
    }

    #[test]
    fn test_runtime_config_from_toml() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [lexical]
            coalesce_newlines = false

            [lexical.comments]
            line = ["//"]
            block = ["/*", "*/"]

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(!config.lexical.coalesce_newlines);
        assert_eq!(config.lexical.comments.line, vec!["//".to_string()]);
        assert_eq!(
            config.lexical.comments.block,
            Some(("/*".to_string(), "*/".to_string()))
        );
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_runtime_config_rejects_bad_toml() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("[lexical\ncoalesce_newlines = 1"),
            Err(ConfigError::Parse(_))
        ));
    }
}
