//! Config Loading Tests
//!
//! Exercises TOML loading from disk and the policy derived from it.
//! Environment-variable lookup is not touched here (tests run in parallel).

use cellstream::config::{ConfigError, ConfigSource, IngestPolicy, ProducerConfig};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn explicit_config_file_is_used() {
    let file = write_config(
        r#"
[input]
path = "batch-7.csv"
pacing_ms = 250

[admin]
open_on_start = false
"#,
    );

    let loaded = ProducerConfig::load(Some(file.path())).expect("config should load");
    assert_eq!(loaded.source, ConfigSource::Explicit(file.path().to_path_buf()));
    assert!(loaded.warnings.is_empty());
    assert_eq!(loaded.config.input.path, Path::new("batch-7.csv"));
    assert!(!loaded.config.admin.open_on_start);

    let policy = IngestPolicy::from_config(&loaded.config);
    assert_eq!(policy.pacing, Duration::from_millis(250));
    assert_eq!(policy.publish_channel, "Cell_Data");
}

#[test]
fn missing_explicit_file_is_an_error() {
    let result = ProducerConfig::load(Some(Path::new("/nonexistent/cellstream.toml")));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn parse_error_names_the_file() {
    let file = write_config("[input\npath = 3");
    match ProducerConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn invalid_values_fail_validation() {
    let file = write_config("[broker]\nmanagement_port = 0\nrequest_timeout_secs = 0\n");
    let err = ProducerConfig::load_from_file(file.path()).expect_err("should be rejected");
    let message = err.to_string();
    assert!(message.contains("management_port"), "{message}");
    assert!(message.contains("request_timeout_secs"), "{message}");
}
