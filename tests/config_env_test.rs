//! Config environment variable tests
//!
//! These tests verify that Config::from_env() reads and applies environment
//! variable overrides, and falls back to defaults for missing or unparsable
//! values.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use generic_invoker::config::{Config, LogFormat, DEFAULT_INVOKE_TIMEOUT_MS};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "GATEWAY_BASE_URL",
    "GATEWAY_INVOKE_PATH",
    "REQUEST_TIMEOUT_MS",
    "INVOKE_TIMEOUT_MS",
    "LOG_LEVEL",
    "LOG_FORMAT",
];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_config_defaults() {
    clear_vars();

    let config = Config::from_env();
    assert_eq!(config.gateway.base_url, "http://127.0.0.1:8080");
    assert_eq!(config.gateway.invoke_path, "/generic/invoke");
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.invoke.timeout_ms, DEFAULT_INVOKE_TIMEOUT_MS);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
#[serial]
fn test_config_from_env_custom_gateway() {
    clear_vars();
    env::set_var("GATEWAY_BASE_URL", "http://gateway.internal:9000");
    env::set_var("GATEWAY_INVOKE_PATH", "/bridge");

    let config = Config::from_env();
    assert_eq!(config.gateway.base_url, "http://gateway.internal:9000");
    assert_eq!(config.gateway.invoke_path, "/bridge");

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    clear_vars();
    env::set_var("LOG_FORMAT", "JSON");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_custom_timeouts() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("INVOKE_TIMEOUT_MS", "1500");

    let config = Config::from_env();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.invoke.timeout_ms, 1500);

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_invalid_numbers_fall_back() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "soon");
    env::set_var("INVOKE_TIMEOUT_MS", "0");

    let config = Config::from_env();
    assert_eq!(config.request.timeout_ms, 30000);
    assert_eq!(config.invoke.timeout_ms, DEFAULT_INVOKE_TIMEOUT_MS);

    clear_vars();
}

#[test]
#[serial]
fn test_config_from_env_zero_request_timeout_falls_back() {
    clear_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "0");

    let config = Config::from_env();
    assert_eq!(config.request.timeout_ms, 30000);

    clear_vars();
}
