use raven_lexer::batch::{self, BatchConfig, BatchResults};
use raven_lexer::config::RuntimeConfig;
use raven_lexer::lexical::{self, LexicalAnalyzer};
use raven_lexer::logging::{self, LoggingService};
use raven_lexer::tokens::TokenStream;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command line options that are not batch settings
#[derive(Debug, Default)]
struct CliOptions {
    json: bool,
    quiet: bool,
    config_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
    threads: Option<usize>,
    sequential: bool,
    no_recursive: bool,
    max_files: Option<usize>,
    fail_fast: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.rv|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(2);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);

    let runtime = match &options.config_path {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    let multi_logger = logging::service::create_configured_multi_logger(options.log_file.as_deref())?;
    logging::init_global_logging_with_service(Arc::new(LoggingService::new(
        Arc::new(multi_logger),
        logging::config::get_min_log_level(),
    )))?;

    raven_lexer::file_processor::init_file_processor_logging()?;
    lexical::init_lexical_analysis_logging()?;

    let input_path = Path::new(&args[1]);
    let clean = if input_path.is_dir() {
        let config = batch_config(&runtime, &options);
        process_directory_batch(input_path, &config, &options)
    } else {
        process_single_file(&args[1], &runtime, &options)
    };

    if !clean {
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("Raven lexer v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizes Raven source files and reports lexical diagnostics");
    println!();
    println!("USAGE:");
    println!("    {} <input.rv> [options]           # Tokenize one file", program_name);
    println!("    {} <directory> [options]          # Tokenize a directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print tokens and diagnostics as JSON");
    println!("    --quiet             Only print diagnostics and the summary");
    println!("    --config FILE       Load preferences from a TOML file");
    println!("    --log-file FILE     Also write log events to FILE");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --threads N         Set maximum number of worker threads");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first failed file");
    println!();
    println!("EXIT STATUS:");
    println!("    0 when every file tokenized without diagnostics, 1 otherwise");
    println!();
    println!("LIMITS:");
    let limits = lexical::get_security_limits();
    println!("    Max token count: {}", limits.max_token_count);
    println!("    Max identifier length: {}", limits.max_identifier_length);
    println!("    Max string size: {}", limits.max_string_size);
    println!(
        "    Max file size: {}",
        raven_lexer::file_processor::get_max_file_size()
    );
    println!("    {}", raven_lexer::config::build_info::source_info());
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--quiet" => options.quiet = true,
            "--sequential" => options.sequential = true,
            "--no-recursive" => options.no_recursive = true,
            "--fail-fast" => options.fail_fast = true,
            "--config" | "--log-file" | "--threads" | "--max-files" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Warning: {} requires a value", args[i]);
                    break;
                };
                match args[i].as_str() {
                    "--config" => options.config_path = Some(PathBuf::from(value)),
                    "--log-file" => options.log_file = Some(PathBuf::from(value)),
                    flag => match value.parse::<usize>() {
                        Ok(n) if flag == "--threads" => options.threads = Some(n.max(1)),
                        Ok(n) => options.max_files = Some(n),
                        Err(_) => eprintln!("Warning: Invalid number '{}' for {}", value, flag),
                    },
                }
                i += 1;
            }
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    options
}

fn batch_config(runtime: &RuntimeConfig, options: &CliOptions) -> BatchConfig {
    let mut config = BatchConfig::from_runtime(runtime);

    if let Some(threads) = options.threads {
        config.max_threads = threads;
    }
    if options.sequential {
        config.max_threads = 1;
    }
    if options.no_recursive {
        config.recursive = false;
    }
    if options.fail_fast {
        config.fail_fast = true;
    }
    config.max_files = options.max_files;
    config.progress_reporting = !options.quiet && !options.json;

    config
}

/// Returns true when the file tokenized without diagnostics
fn process_single_file(file_path: &str, runtime: &RuntimeConfig, options: &CliOptions) -> bool {
    let file_result = match raven_lexer::file_processor::create_processor_from_preferences(
        &runtime.file_processor,
    )
    .process_file(file_path)
    {
        Ok(file_result) => file_result,
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            return false;
        }
    };

    let mut analyzer = LexicalAnalyzer::with_preferences(runtime.lexical.clone());
    match logging::with_file_context(file_result.metadata.path.clone(), 0, || {
        analyzer.tokenize_file_result(&file_result)
    }) {
        Ok(stream) => {
            print_stream(&stream, options);
            !stream.has_errors()
        }
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            false
        }
    }
}

fn print_stream(stream: &TokenStream, options: &CliOptions) {
    if options.json {
        let output = serde_json::json!({
            "tokens": stream.tokens(),
            "diagnostics": stream.diagnostics(),
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("error: failed to serialize tokens: {}", e),
        }
    } else if !options.quiet {
        for token in stream {
            println!("{:>5}  {:<26} {}", token.line(), token.kind().name(), token.payload());
        }
    }

    for diagnostic in stream.diagnostics() {
        eprintln!("{}", stream.format_diagnostic(diagnostic));
    }
}

/// Returns true when every file tokenized cleanly
fn process_directory_batch(dir_path: &Path, config: &BatchConfig, options: &CliOptions) -> bool {
    if !options.quiet && !options.json {
        println!("Starting batch tokenization: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.effective_threads(),
            config.recursive,
            config.fail_fast
        );
    }

    match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => {
            if options.json {
                print_batch_json(&results);
            } else {
                print_batch_results(&results);
                logging::print_cargo_style_summary();
            }
            results.failure_count() == 0 && results.diagnostic_count() == 0
        }
        Err(error) => {
            eprintln!("error[{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            false
        }
    }
}

fn print_batch_json(results: &BatchResults) {
    let files: Vec<_> = results
        .successful_files
        .iter()
        .map(|(path, file)| {
            serde_json::json!({
                "file": path.display().to_string(),
                "tokens": file.stream.tokens(),
                "diagnostics": file.stream.diagnostics(),
                "metrics": file.metrics,
            })
        })
        .collect();
    let failures: Vec<_> = results
        .failed_files
        .iter()
        .map(|(path, error)| {
            serde_json::json!({
                "file": path.display().to_string(),
                "code": error.error_code().as_str(),
                "error": error.to_string(),
            })
        })
        .collect();

    let output = serde_json::json!({ "files": files, "failures": failures });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to serialize batch results: {}", e),
    }
}

fn print_batch_results(results: &BatchResults) {
    println!("\nBatch Tokenization Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!(
        "  Successful: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!("  Tokens: {}", results.token_count());
    println!("  Diagnostics: {}", results.diagnostic_count());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let seconds = results.processing_duration.as_secs_f64();
    if seconds > 0.0 {
        println!(
            "  Processing rate: {:.0} tokens/sec",
            results.token_count() as f64 / seconds
        );
    }

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: [{}] {}", file_path.display(), error.error_code(), error);
        }
    }

    for (_, file) in &results.successful_files {
        for diagnostic in file.stream.diagnostics() {
            eprintln!("{}", file.stream.format_diagnostic(diagnostic));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&strings(&[
            "--threads",
            "4",
            "--fail-fast",
            "--no-recursive",
            "--json",
            "--log-file",
            "out.log",
        ]));
        assert_eq!(options.threads, Some(4));
        assert!(options.fail_fast);
        assert!(options.no_recursive);
        assert!(options.json);
        assert_eq!(options.log_file, Some(PathBuf::from("out.log")));
    }

    #[test]
    fn test_parse_options_invalid() {
        let options = parse_options(&strings(&["--threads", "many", "--unknown", "--max-files"]));
        assert_eq!(options.threads, None);
        assert_eq!(options.max_files, None);
    }

    #[test]
    fn test_batch_config_overrides() {
        let options = parse_options(&strings(&["--sequential", "--threads", "6", "--max-files", "3"]));
        let config = batch_config(&RuntimeConfig::default(), &options);
        assert_eq!(config.max_threads, 1);
        assert_eq!(config.max_files, Some(3));
    }
}
