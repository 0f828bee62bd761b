//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Well-known GitHub environment variables (token, host)
//! 2. Environment variables (OCTO_MCP_*)
//! 3. Configuration file (TOML)
//! 4. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use crate::lockdown::MAX_TTL;
use crate::toolsets::Toolset;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "octo-mcp.toml",
    ".octo-mcp.toml",
    "~/.config/octo-mcp/config.toml",
    "/etc/octo-mcp/config.toml",
];

/// Token variables, in order of precedence
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_PERSONAL_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config, false)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. OCTO_MCP_GITHUB__HOST, OCTO_MCP_LOCKDOWN__ENABLED=true,
    // OCTO_MCP_TOOLSETS__ENABLED=issues,pull_requests
    builder = builder.add_source(
        Environment::with_prefix("OCTO_MCP")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("toolsets.enabled")
            .try_parsing(true),
    );

    for env_var in TOKEN_ENV_VARS {
        if let Ok(token) = std::env::var(env_var)
            && !token.is_empty()
        {
            builder = builder
                .set_override("github.token", token)
                .map_err(|e| ConfigError::Load(e.to_string()))?;
            break;
        }
    }

    if let Ok(host) = std::env::var("GITHUB_HOST") {
        builder = builder
            .set_override("github.host", host)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
    }

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config, true)?;

    Ok(app_config)
}

/// Validate configuration values
///
/// `require_token` is relaxed for configs built in tests.
pub fn validate_config(config: &AppConfig, require_token: bool) -> Result<(), ConfigError> {
    let host = &config.github.host;
    if host.is_empty() {
        return Err(ConfigError::Missing {
            field: "github.host".to_string(),
        });
    }

    if !host.starts_with("http://") && !host.starts_with("https://") {
        return Err(ConfigError::Invalid {
            message: format!(
                "github.host must start with http:// or https://, got: {}",
                host
            ),
        });
    }

    if require_token
        && config
            .github
            .token
            .as_ref()
            .is_none_or(|token| token.is_empty())
    {
        return Err(ConfigError::Missing {
            field: "github.token (set GITHUB_PERSONAL_ACCESS_TOKEN environment variable)"
                .to_string(),
        });
    }

    if config.github.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "github.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    if config.lockdown.cache_ttl_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "lockdown.cache_ttl_secs must be greater than 0".to_string(),
        });
    }

    if config.lockdown.cache_ttl_secs > MAX_TTL.as_secs() {
        return Err(ConfigError::Invalid {
            message: format!(
                "lockdown.cache_ttl_secs must be at most {}",
                MAX_TTL.as_secs()
            ),
        });
    }

    if config.lockdown.max_entries == 0 {
        return Err(ConfigError::Invalid {
            message: "lockdown.max_entries must be greater than 0".to_string(),
        });
    }

    for name in &config.toolsets.enabled {
        if name != "all" && Toolset::try_parse(name).is_none() {
            return Err(ConfigError::Invalid {
                message: format!("unknown toolset '{}' in toolsets.enabled", name),
            });
        }
    }

    Ok(())
}
