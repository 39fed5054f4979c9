//! Logging macros. Context values accept anything implementing Display.
//!
//! ```ignore
//! log_error!(codes::lexical::MALFORMED_NUMBER, "Malformed number",
//!     position = error.position().clone(),
//!     "lexeme" => error.lexeme()
//! );
//! ```

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::error($code, $message))
    };

    ($code:expr, $message:expr, position = $position:expr) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message).with_position($position),
        )
    };

    ($code:expr, $message:expr, position = $position:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message).with_position($position);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::error($code, $message);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::success($code, $message))
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::success($code, $message);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::info($message))
    };

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::info($message);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::emit($crate::logging::LogEvent::warning($message))
    };

    ($message:expr, position = $position:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::warning($message).with_position($position);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let mut event = $crate::logging::LogEvent::warning($message);
        $( event = event.with_context($key, &format!("{}", $value)); )+
        $crate::logging::emit(event)
    }};
}

/// Context is only formatted when debug logging is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::emit($crate::logging::LogEvent::debug($message))
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let mut event = $crate::logging::LogEvent::debug($message);
            $( event = event.with_context($key, &format!("{}", $value)); )+
            $crate::logging::emit(event)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::{self, codes, ErrorCollector};
    use crate::utils::SourcePosition;
    use std::path::PathBuf;

    #[test]
    fn test_macros_expand_without_global_logger() {
        let path = PathBuf::from("macro_test.rv");

        logging::with_file_context(path.clone(), 0, || {
            log_error!(codes::lexical::MALFORMED_NUMBER, "Malformed number",
                position = SourcePosition::new("macro_test.rv", 2),
                "lexeme" => "1.2.3"
            );
            log_warning!("Long comment", "length" => 12_000usize);
            log_success!(codes::success::TOKENIZATION_COMPLETE, "Done", "tokens" => 5);
            log_info!("Scanning", "file" => path.display());
            log_debug!("Debug detail", "offset" => 17);
        });

        // Without init the events go nowhere; the collector API still works standalone
        let collector = ErrorCollector::new();
        assert_eq!(collector.total_event_count(), 0);
    }
}
