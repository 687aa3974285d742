// Integration tests for logging functionality
// Note: initializing the logger installs a process-wide subscriber, so this
// file holds a single test

use std::fs;

use pacer::domain::models::LoggingConfig;
use pacer::infrastructure::logging::{info, instrument, LoggerImpl};
use pacer::services::NonBlockingOperation;
use tempfile::TempDir;

#[test]
fn test_logging_comprehensive() {
    let temp_dir = TempDir::new().unwrap();

    let config = LoggingConfig {
        level: "debug".to_string(),
        format: "json".to_string(),
        log_dir: Some(temp_dir.path().to_path_buf()),
    };

    let logger = LoggerImpl::init(&config).unwrap();

    info!("Test message 1");
    info!(key = "value", "Test message with fields");

    assert_eq!(instrumented_add(5, 7), 12);

    // Helper spans reach the file layer too
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let sum = runtime.block_on(async { NonBlockingOperation::new(|| 2 + 2).run().await });
    assert_eq!(sum, Ok(4));

    // A second init must fail instead of replacing the subscriber
    assert!(LoggerImpl::init(&config).is_err());

    // Dropping the guard flushes the non-blocking writer
    drop(logger);

    let log_files: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains("pacer.log"))
        .collect();

    assert!(!log_files.is_empty(), "Log file should be created");

    let contents = fs::read_to_string(log_files[0].path()).unwrap();
    assert!(contents.contains("Test message 1"), "Log should contain basic message");
    assert!(
        contents.contains("Test message with fields"),
        "Log should contain message with fields"
    );
    assert!(
        contents.contains("entering instrumented function"),
        "Log should contain instrumented function traces"
    );
    assert!(contents.contains("instrumented_add"), "Log should carry the span name");

    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        serde_json::from_str::<serde_json::Value>(line).expect("file logs are JSON lines");
    }
}

#[instrument]
fn instrumented_add(a: i32, b: i32) -> i32 {
    info!("entering instrumented function");
    a + b
}
