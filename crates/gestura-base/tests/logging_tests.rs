use gestura_base::logging::{FileLogger, StdoutLogger, format_record, init_file_logger, init_stdout_logger};
use log::Log;
use std::fs;

#[test]
fn test_format_record_contains_fields() {
    let record = log::RecordBuilder::new()
        .level(log::Level::Warn)
        .target("gestura_core::pipeline")
        .file(Some("pipeline.rs"))
        .line(Some(42))
        .args(format_args!("camera exhausted"))
        .build();
    let line = format_record(&record);
    assert!(line.contains("[WARN]"));
    assert!(line.contains("thread:"));
    assert!(line.contains("gestura_core::pipeline"));
    assert!(line.contains("pipeline.rs:42"));
    assert!(line.ends_with("camera exhausted"));
}

#[test]
fn test_stdout_logger_implements_log_trait() {
    let logger = StdoutLogger;
    let metadata = log::MetadataBuilder::new()
        .level(log::Level::Info)
        .target("test")
        .build();
    assert!(logger.enabled(&metadata));
    let record = log::RecordBuilder::new()
        .level(log::Level::Info)
        .target("test")
        .args(format_args!("stdout message"))
        .build();
    logger.log(&record);
    logger.flush();
}

#[test]
fn test_file_logger_writes_to_day_file() {
    let test_dir =
        std::env::temp_dir().join(format!("gestura-log-test-{}-write", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let logger = FileLogger::new(&test_dir).expect("Failed to create FileLogger");
    let record = log::RecordBuilder::new()
        .level(log::Level::Error)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(100))
        .args(format_args!("device unavailable"))
        .build();
    logger.log(&record);
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&test_dir)
        .expect("Failed to read test directory")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1);

    let content = fs::read_to_string(entries[0].path()).expect("Failed to read log file");
    assert!(content.contains("[ERROR]"));
    assert!(content.contains("test.rs:100"));
    assert!(content.contains("device unavailable"));
    assert!(content.ends_with('\n'));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn test_init_stdout_logger_sets_global_logger() {
    init_stdout_logger();
    assert!(log::logger().enabled(
        &log::MetadataBuilder::new()
            .level(log::Level::Info)
            .target("test")
            .build()
    ));
    log::info!("Test message from global logger");
}

#[test]
fn test_init_file_logger_invalid_dir_returns_error() {
    assert!(init_file_logger("/proc/nonexistent/path").is_err());
}
