//! Configuration loading tests

use octo_mcp::config::{LogFormat, TransportMode, load_config, load_config_from_str};
use serial_test::serial;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const FULL_CONFIG: &str = r#"
[server]
name = "octo-mcp-test"
version = "0.1.0"
transport = "http"
host = "0.0.0.0"
port = 9000

[github]
host = "https://github.company.com"
token = "ghp_test"
timeout_secs = 60
max_retries = 5
verify_ssl = false

[lockdown]
enabled = true
cache_ttl_secs = 120
max_entries = 500

[toolsets]
enabled = ["issues", "pull_requests", "context"]
read_only = true

[logging]
level = "debug"
format = "json"
"#;

const ENV_VARS: &[&str] = &[
    "GITHUB_PERSONAL_ACCESS_TOKEN",
    "GITHUB_TOKEN",
    "GITHUB_HOST",
    "OCTO_MCP_LOCKDOWN__ENABLED",
    "OCTO_MCP_LOCKDOWN__CACHE_TTL_SECS",
    "OCTO_MCP_TOOLSETS__ENABLED",
];

fn clear_env() {
    for var in ENV_VARS {
        // SAFETY: tests touching the environment are serialized
        unsafe { std::env::remove_var(var) };
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment are serialized
    unsafe { std::env::set_var(key, value) };
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.server.name, "octo-mcp-test");
    assert_eq!(config.server.transport, TransportMode::Http);
    assert_eq!(config.server.port, 9000);

    assert_eq!(config.github.host, "https://github.company.com");
    assert_eq!(config.github.rest_url(), "https://github.company.com/api/v3");
    assert_eq!(config.github.graphql_url(), "https://github.company.com/api/graphql");
    assert_eq!(config.github.timeout_secs, 60);
    assert!(!config.github.verify_ssl);

    assert!(config.lockdown.enabled);
    assert_eq!(config.lockdown.cache_ttl().as_secs(), 120);
    assert_eq!(config.lockdown.max_entries, 500);

    assert_eq!(config.toolsets.enabled.len(), 3);
    assert!(config.toolsets.read_only);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_defaults() {
    let config = load_config_from_str("").unwrap();

    assert_eq!(config.github.host, "https://github.com");
    assert_eq!(config.github.rest_url(), "https://api.github.com");
    assert!(!config.lockdown.enabled);
    assert_eq!(config.lockdown.cache_ttl_secs, 300);
    assert_eq!(config.toolsets.enabled, vec!["all"]);
    assert_eq!(config.server.transport, TransportMode::Stdio);
}

#[test]
fn test_token_is_redacted_in_debug() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();
    let debug = format!("{:?}", config.github);
    assert!(!debug.contains("ghp_test"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
#[serial]
fn test_load_config_from_file() {
    clear_env();
    let file = config_file(FULL_CONFIG);

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.server.name, "octo-mcp-test");
    assert!(config.lockdown.enabled);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env();
    let err = load_config(Some("/nonexistent/octo-mcp.toml")).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
#[serial]
fn test_token_env_overrides_file() {
    clear_env();
    set_env("GITHUB_PERSONAL_ACCESS_TOKEN", "ghp_from_env");
    set_env("GITHUB_TOKEN", "ghp_lower_precedence");
    let file = config_file(FULL_CONFIG);

    let config = load_config(file.path().to_str()).unwrap();
    clear_env();

    assert_eq!(
        config.github.token.as_ref().map(|t| t.expose_secret()),
        Some("ghp_from_env")
    );
}

#[test]
#[serial]
fn test_prefixed_env_overrides() {
    clear_env();
    set_env("OCTO_MCP_LOCKDOWN__ENABLED", "true");
    set_env("OCTO_MCP_TOOLSETS__ENABLED", "issues,repos");
    set_env("GITHUB_TOKEN", "ghp_env");
    set_env("GITHUB_HOST", "https://ghe.example.com");
    let file = config_file("[server]\nname = \"env-test\"\n");

    let config = load_config(file.path().to_str()).unwrap();
    clear_env();

    assert!(config.lockdown.enabled);
    assert_eq!(config.toolsets.enabled, vec!["issues", "repos"]);
    assert_eq!(config.github.host, "https://ghe.example.com");
}

#[test]
#[serial]
fn test_missing_token_rejected() {
    clear_env();
    let file = config_file("[server]\nname = \"no-token\"\n");
    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(err.to_string().contains("github.token"));
}

#[test]
#[serial]
fn test_oversized_ttl_from_env_rejected() {
    clear_env();
    set_env("GITHUB_TOKEN", "ghp_env");
    set_env("OCTO_MCP_LOCKDOWN__CACHE_TTL_SECS", "10000000000");
    let file = config_file("[lockdown]\nenabled = true\n");

    let err = load_config(file.path().to_str()).unwrap_err();
    clear_env();

    assert!(err.to_string().contains("cache_ttl_secs"));
}
