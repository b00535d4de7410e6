//! Integration tests for configuration loading and validation

use modelproxy_core::config::{
    load_from_yaml, ConfigError, ConfigValidator, ProxyConfig, ValidationErrorKind,
};
use modelproxy_core::decode::FrameFormat;
use modelproxy_core::ModelAdapter;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test config file
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_valid_yaml_config() {
    std::env::set_var("MODELPROXY_TEST_HF_KEY", "hf_from_env_value");

    let yaml = r#"
model:
  proxy_url: hf://https://api-inference.huggingface.co/models/gpt2
  hf_api_key: ${MODELPROXY_TEST_HF_KEY}
  max_new_tokens: 128
server:
  bind_address: 127.0.0.1
  port: 8088
connection:
  request_timeout_secs: 30
streaming:
  framing: raw
  idle_timeout_secs: 15
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "proxy.yaml", yaml);

    let config = load_from_yaml(&path).unwrap();
    assert_eq!(config.model.max_new_tokens, 128);
    assert_eq!(
        config.model.hf_api_key.as_ref().map(|k| k.expose_secret()),
        Some("hf_from_env_value")
    );
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.connection.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.streaming.framing, Some(FrameFormat::Raw));

    // Secrets never leak through Debug output.
    assert!(!format!("{:?}", config).contains("hf_from_env_value"));

    let adapter = ModelAdapter::from_config(&config).unwrap();
    assert_eq!(adapter.kind().id(), "huggingface");
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = load_from_yaml(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn test_missing_env_var_in_file() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(
        &dir,
        "proxy.yaml",
        "model:\n  api_key: ${MODELPROXY_TEST_DEFINITELY_UNSET}\n",
    );

    match load_from_yaml(&path) {
        Err(ConfigError::MissingEnvVar { var }) => {
            assert_eq!(var, "MODELPROXY_TEST_DEFINITELY_UNSET")
        }
        other => panic!("Expected MissingEnvVar, got {:?}", other),
    }
}

#[test]
fn test_malformed_yaml_reports_location() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "proxy.yaml", "server:\n  port: [not, a, port\n");

    match load_from_yaml(&path) {
        Err(ConfigError::Parse { line, .. }) => assert!(line.is_some()),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "proxy.yaml", "server:\n  port: 0\n");

    match load_from_yaml(&path) {
        Err(ConfigError::Invalid(err)) => {
            assert_eq!(err.field, "server.port");
            assert!(matches!(err.kind, ValidationErrorKind::OutOfRange(_)));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_validator_rejects_zero_idle_timeout() {
    let mut config = ProxyConfig::default();
    config.streaming.idle_timeout_secs = Some(0);
    let err = ConfigValidator::new().validate(&config).unwrap_err();
    assert_eq!(err.field, "streaming.idle_timeout_secs");
}

#[test]
fn test_bad_bind_address_is_rejected() {
    let mut config = ProxyConfig::default();
    config.server.bind_address = "localhost:4000".to_string();
    let err = ConfigValidator::new().validate(&config).unwrap_err();
    assert!(matches!(err.kind, ValidationErrorKind::Malformed(_)));
}
