//! Integration tests for logging system

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::Arc;

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("provider_botb=debug,core_playback=trace");

    assert_eq!(
        config.filter,
        Some("provider_botb=debug,core_playback=trace".to_string())
    );
}

// Only one test in this binary installs the global subscriber.
#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    init_logging(config.clone()).unwrap();
    tracing::info!(target: "provider_botb", "logging ready");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Config(_))));
}
