//! Batch tokenization of Raven source directories
//!
//! Discovers `.rv` files, then runs each through the file processor and the
//! lexical analyzer, sequentially or on a fixed set of worker threads. Every
//! file is processed under its own logging context so diagnostics land in the
//! error collector's per-file summary.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::constants::SOURCE_FILE_EXTENSION;
use crate::config::runtime::{FileProcessorPreferences, LexicalPreferences, RuntimeConfig};
use crate::file_processor::{FileProcessor, FileProcessorError};
use crate::lexical::{LexicalAnalysisError, LexicalAnalyzer, LexicalMetrics, RecognizerSet};
use crate::logging::{self, codes};
use crate::tokens::TokenStream;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub recognizers: RecognizerSet,
}

impl BatchConfig {
    pub fn from_runtime(runtime: &RuntimeConfig) -> Self {
        Self {
            max_threads: runtime.batch.worker_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: runtime.batch.recursive,
            max_files: None,
            progress_reporting: false,
            fail_fast: runtime.batch.fail_fast,
            file_processor: runtime.file_processor.clone(),
            lexical: runtime.lexical.clone(),
            recognizers: RecognizerSet::new(),
        }
    }

    /// Worker count actually used
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: false,
            fail_fast: false,
            file_processor: FileProcessorPreferences::default(),
            lexical: LexicalPreferences::default(),
            recognizers: RecognizerSet::new(),
        }
    }
}

/// A tokenized file
#[derive(Debug)]
pub struct FileTokens {
    pub stream: TokenStream,
    pub metrics: LexicalMetrics,
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, FileTokens)>,
    pub failed_files: Vec<(PathBuf, LexicalAnalysisError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    /// Lexical diagnostics across every tokenized file
    pub fn diagnostic_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, file)| file.stream.diagnostics().len())
            .sum()
    }

    pub fn token_count(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, file)| file.stream.len())
            .sum()
    }

    pub fn add_success(&mut self, file_path: PathBuf, tokens: FileTokens) {
        self.successful_files.push((file_path, tokens));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: LexicalAnalysisError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Restore discovery order after parallel runs
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch tokenization completed: {} files processed, {} successful ({:.1}%), {} failed, {} tokens, {} diagnostics, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.token_count(),
            self.diagnostic_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .rv files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread failed: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            Self::NoFilesFound { .. } => codes::batch::NO_SOURCE_FILES,
            Self::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            Self::IoError { .. } => codes::batch::DIRECTORY_IO_ERROR,
            Self::ThreadError { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Sorted list of source files under `dir_path`
pub fn discover_source_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        });
    }

    files.sort();

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!("Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }

    crate::log_success!(
        codes::success::BATCH_DISCOVERY_COMPLETE,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
        let path = entry.path();

        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config)?;
            }
        } else if is_source_file(&path) {
            files.push(path);

            // stop walking well past the ceiling; the caller reports it
            if files.len() > MAX_FILES_PER_BATCH {
                return Ok(());
            }
        }
    }

    Ok(())
}

fn is_source_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(SOURCE_FILE_EXTENSION))
            .unwrap_or(false)
}

/// Split discovered files into processable ones and rejects with a reason
fn validate_files(files: &[PathBuf]) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut valid_files = Vec::new();
    let mut invalid_files = Vec::new();

    for file in files {
        match validate_single_file(file) {
            Ok(()) => valid_files.push(file.clone()),
            Err(reason) => invalid_files.push((file.clone(), reason)),
        }
    }

    if !invalid_files.is_empty() {
        crate::log_warning!("Some files failed validation",
            "valid_files" => valid_files.len(),
            "invalid_files" => invalid_files.len()
        );
    }

    (valid_files, invalid_files)
}

fn validate_single_file(file_path: &Path) -> Result<(), String> {
    if !file_path.is_file() {
        return Err("Path is not a file".to_string());
    }

    if file_path.to_str().is_none() {
        return Err("Path is not valid UTF-8".to_string());
    }

    match fs::metadata(file_path) {
        Ok(metadata) if metadata.len() > MAX_FILE_SIZE => Err(format!(
            "File too large: {} bytes (max: {} bytes)",
            metadata.len(),
            MAX_FILE_SIZE
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(format!("Cannot read file metadata: {}", e)),
    }
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Load and tokenize one file. Runs inside the caller's file context.
fn tokenize_single_file(
    file_path: &Path,
    config: &BatchConfig,
) -> Result<FileTokens, LexicalAnalysisError> {
    let path = file_path.to_str().ok_or_else(|| FileProcessorError::InvalidPath {
        path: file_path.display().to_string(),
    })?;

    let file_result = FileProcessor::from_preferences(&config.file_processor).process_file(path)?;
    let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone())
        .with_recognizers(config.recognizers.clone());
    let stream = analyzer.tokenize_file_result(&file_result)?;

    Ok(FileTokens {
        stream,
        metrics: analyzer.metrics().clone(),
    })
}

fn record_outcome(
    results: &mut BatchResults,
    file_path: &Path,
    file_id: usize,
    outcome: Result<FileTokens, LexicalAnalysisError>,
) {
    match outcome {
        Ok(tokens) => {
            crate::log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File tokenized",
                "file" => file_path.display(),
                "file_id" => file_id,
                "tokens" => tokens.stream.len(),
                "diagnostics" => tokens.stream.diagnostics().len()
            );
            results.add_success(file_path.to_path_buf(), tokens);
        }
        Err(error) => {
            crate::log_error!(error.error_code(), "File processing failed",
                "file" => file_path.display(),
                "file_id" => file_id,
                "error" => &error
            );
            results.add_failure(file_path.to_path_buf(), error);
        }
    }
}

fn log_rejected_files(invalid_files: &[(PathBuf, String)]) {
    for (file_path, reason) in invalid_files {
        crate::log_error!(
            codes::file_processing::INVALID_PATH,
            "File validation failed",
            "file" => file_path.display(),
            "reason" => reason
        );
    }
}

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display()
    );

    let discovered_files = discover_source_files(dir_path, config)?;
    let (valid_files, invalid_files) = validate_files(&discovered_files);
    log_rejected_files(&invalid_files);

    let mut results = BatchResults::new();
    results.files_discovered = discovered_files.len();

    for (file_id, file_path) in valid_files.iter().enumerate() {
        if config.progress_reporting {
            eprintln!(
                "Tokenizing file {} of {}: {}",
                file_id + 1,
                valid_files.len(),
                file_path.display()
            );
        }

        let failed = logging::with_file_context(file_path.clone(), file_id, || {
            let outcome = tokenize_single_file(file_path, config);
            let failed = outcome.is_err();
            record_outcome(&mut results, file_path, file_id, outcome);
            failed
        });

        if failed && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);

    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.effective_threads();

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let discovered_files = discover_source_files(dir_path, config)?;
    let (valid_files, invalid_files) = validate_files(&discovered_files);
    log_rejected_files(&invalid_files);

    let mut results = BatchResults::new();
    results.files_discovered = discovered_files.len();

    // workers only read the keyword table; build it before spawning
    crate::grammar::init_keyword_table();

    let chunk_size = calculate_chunk_size(valid_files.len(), threads);
    let shared_config = Arc::new(config.clone());

    crate::log_debug!("Parallel processing configuration",
        "total_files" => valid_files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in valid_files.chunks(chunk_size).enumerate() {
        let chunk_results =
            process_chunk_parallel(chunk, chunk_index * chunk_size, threads, &shared_config)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);

    Ok(results)
}

/// Split a chunk across at most `threads` workers sharing one result set
fn process_chunk_parallel(
    files: &[PathBuf],
    first_file_id: usize,
    threads: usize,
    config: &Arc<BatchConfig>,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads).max(1);
    let mut handles = Vec::new();

    for (thread_id, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let base_id = first_file_id + thread_id * files_per_thread;
        let config = Arc::clone(config);
        let results_clone = Arc::clone(&results);

        let handle = thread::spawn(move || {
            for (local_id, file_path) in thread_files.iter().enumerate() {
                let file_id = base_id + local_id;
                logging::with_file_context(file_path.clone(), file_id, || {
                    let outcome = tokenize_single_file(file_path, &config);
                    // poisoned only if a sibling panicked mid-record
                    let mut guard = results_clone.lock().unwrap_or_else(PoisonError::into_inner);
                    record_outcome(&mut guard, file_path, file_id, outcome);
                });
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().map_err(|_| {
            crate::log_error!(codes::batch::WORKER_FAILURE, "Worker thread panicked");
            BatchError::ThreadError {
                message: "Thread panicked during processing".to_string(),
            }
        })?;
    }

    let chunk_results = Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Failed to extract results from worker threads".to_string(),
        })?
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    Ok(chunk_results)
}

fn calculate_chunk_size(file_count: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 50;

    let ideal_chunk_size = file_count.div_ceil(max_threads.max(1));
    ideal_chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch tokenization completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "tokens" => results.token_count(),
        "diagnostics" => results.diagnostic_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.effective_threads() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_file_discovery() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();

        fs::write(temp_path.join("a.rv"), "var a = 1\n").unwrap();
        fs::write(temp_path.join("b.RV"), "var b = 2\n").unwrap();
        fs::write(temp_path.join("notes.txt"), "not raven").unwrap();
        fs::create_dir(temp_path.join("nested")).unwrap();
        fs::write(temp_path.join("nested").join("c.rv"), "c\n").unwrap();

        let files = discover_source_files(temp_path, &config(1)).unwrap();
        assert_eq!(files.len(), 3);

        let flat = BatchConfig {
            recursive: false,
            ..config(1)
        };
        let files = discover_source_files(temp_path, &flat).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_discovery_errors() {
        let temp_dir = tempdir().unwrap();
        let result = discover_source_files(&temp_dir.path().join("missing"), &config(1));
        assert_matches!(result, Err(BatchError::DirectoryNotFound { .. }));

        let result = discover_source_files(temp_dir.path(), &config(1));
        assert_matches!(result, Err(ref e @ BatchError::NoFilesFound { .. }) if e.error_code().as_str() == "B002");
    }

    #[test]
    fn test_max_files_truncates() {
        let temp_dir = tempdir().unwrap();
        for name in ["a.rv", "b.rv", "c.rv"] {
            fs::write(temp_dir.path().join(name), "x\n").unwrap();
        }
        let limited = BatchConfig {
            max_files: Some(2),
            ..config(1)
        };
        let files = discover_source_files(temp_dir.path(), &limited).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.rv"));
    }

    #[test]
    fn test_file_validation() {
        let temp_dir = tempdir().unwrap();
        let valid_file = temp_dir.path().join("valid.rv");
        fs::write(&valid_file, "x\n").unwrap();

        let files = vec![valid_file, temp_dir.path().join("nonexistent.rv")];
        let (valid, invalid) = validate_files(&files);

        assert_eq!(valid.len(), 1);
        assert_eq!(invalid.len(), 1);
    }

    #[test]
    fn test_sequential_processing() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("good.rv"), "var x = 1\n").unwrap();
        fs::write(temp_dir.path().join("noisy.rv"), "x = `\n").unwrap();
        fs::write(temp_dir.path().join("empty.rv"), "").unwrap();

        let results = process_directory_sequential(temp_dir.path(), &config(1)).unwrap();

        assert_eq!(results.files_discovered, 3);
        assert_eq!(results.files_processed, 3);
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.diagnostic_count(), 1);
        assert_matches!(
            results.failed_files[0].1,
            LexicalAnalysisError::File(FileProcessorError::EmptyFile)
        );
    }

    #[test]
    fn test_fail_fast_stops_early() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.rv"), "").unwrap();
        fs::write(temp_dir.path().join("b.rv"), "x\n").unwrap();

        let stop = BatchConfig {
            fail_fast: true,
            ..config(1)
        };
        let results = process_directory_sequential(temp_dir.path(), &stop).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let temp_dir = tempdir().unwrap();
        for i in 0..7 {
            fs::write(
                temp_dir.path().join(format!("f{}.rv", i)),
                format!("var v{} = {}\nwhile v{} > 0 {{ v{} -= 1 }}\n", i, i, i, i),
            )
            .unwrap();
        }

        let sequential = process_directory_sequential(temp_dir.path(), &config(1)).unwrap();
        let parallel = process_directory_parallel(temp_dir.path(), &config(3)).unwrap();

        assert_eq!(parallel.success_count(), 7);
        assert_eq!(parallel.token_count(), sequential.token_count());
        let order: Vec<_> = parallel.successful_files.iter().map(|(p, _)| p.clone()).collect();
        let expected: Vec<_> = sequential.successful_files.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
        assert_eq!(calculate_chunk_size(0, 4), 1);
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert!(config.effective_threads() >= 1);
        assert!(config.recursive);
        assert!(!config.fail_fast);
        assert!(config.max_files.is_none());
    }
}
