use mysql_import::{ConfigError, LogConfig, LoggingConfig, init_logging};
use serial_test::serial;
use tracing::{info, warn};

#[test]
#[serial]
fn test_file_logging_and_single_install() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("import.log");

    let config = LogConfig::from_config(&LoggingConfig {
        level: "info".to_string(),
        file: Some(log_path.to_string_lossy().into_owned()),
        console: false,
    });
    init_logging(config).unwrap();

    info!(database = "shop", "creating database");
    warn!("user connection failed, trying root");

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("creating database"));
    assert!(content.contains("trying root"));

    let second = init_logging(LogConfig::new().with_console(false));
    assert!(matches!(second, Err(ConfigError::Logging(_))));
}
