//! Configuration loading for the bosun binary

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub cache: CacheConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

/// Engine binary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the control binary.
    pub binary: String,
    /// Load-balancer configuration file the binary operates on.
    pub config_file: String,
    /// Wall-clock limit per engine invocation, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "lbctl".to_string(),
            config_file: "/etc/lb/lb.cfg".to_string(),
            timeout_secs: Some(30),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Client behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Validate write payloads before they reach the engine.
    pub validate: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { validate: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.binary, "lbctl");
        assert!(config.cache.enabled);
        assert!(config.client.validate);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [engine]
            binary = "/usr/local/bin/lbctl"

            [cache]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.binary, "/usr/local/bin/lbctl");
        assert_eq!(config.engine.config_file, "/etc/lb/lb.cfg");
        assert!(!config.cache.enabled);
        assert!(config.client.validate);
    }
}
