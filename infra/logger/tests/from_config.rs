use lms_domain::config::LogConfig;
use lms_logger::{Logger, LoggerError};
use std::fs;
use std::time::Duration;

#[test]
fn from_config_writes_json_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempfile::tempdir()?;
    let log_dir = tmp_dir.path().join("logs");
    let config = LogConfig {
        level: "debug".to_owned(),
        filter: Some("from_config=debug".to_owned()),
        console: false,
        directory: Some(log_dir.clone()),
        json: true,
        max_files: 3,
    };

    let logger = Logger::from_config("lms-from-config", &config)?;
    assert!(logger.guard().is_some());

    tracing::info!(kind = "order_completed", "json record");
    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let log_file = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(log_file)?;
    assert!(contents.contains("\"kind\":\"order_completed\""), "unexpected contents: {contents}");
    Ok(())
}

#[test]
fn from_config_rejects_unknown_level() {
    let config = LogConfig { level: "chatty".to_owned(), ..LogConfig::default() };

    let err = Logger::from_config("lms-bad-level", &config).expect_err("level must be rejected");
    assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
}
