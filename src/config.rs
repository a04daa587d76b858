//! Configuration management for dutyctl.
//!
//! This module provides TOML configuration file loading from
//! `~/.dutyctl/config.toml`. Every field is optional; command-line
//! flags override the file, and the file overrides the built-in
//! defaults (the controller's factory address).
//!
//! # Configuration File
//!
//! ```toml
//! # Controller address (optional)
//! address = "192.168.1.19"
//! port = 3333
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Controller address used when nothing else is configured
pub const DEFAULT_ADDRESS: &str = "192.168.1.19";
/// Controller port used when nothing else is configured
pub const DEFAULT_PORT: u16 = 3333;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Controller host or IP address
    pub address: Option<String>,
    /// Controller TCP port
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Self {
        if let Some(path) = Self::get_config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::get_config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// Get config file path
    fn get_config_path() -> Option<PathBuf> {
        if let Some(home) = home_dir() {
            let dutyctl_dir = home.join(".dutyctl");
            if !dutyctl_dir.exists() {
                let _ = fs::create_dir_all(&dutyctl_dir);
            }
            return Some(dutyctl_dir.join("config.toml"));
        }
        None
    }
}

/// Resolve the controller endpoint: a command-line flag beats the
/// config file, and the config file beats the built-in default
pub fn resolve(
    cli_address: Option<String>,
    cli_port: Option<u16>,
    file: Config,
) -> (String, u16) {
    let address = cli_address
        .or(file.address)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let port = cli_port.or(file.port).unwrap_or(DEFAULT_PORT);
    (address, port)
}

// Get home directory
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let config: Config = toml::from_str(
            r#"
            address = "10.0.0.7"
            port = 4444
            "#,
        )
        .unwrap();
        assert_eq!(config.address.as_deref(), Some("10.0.0.7"));
        assert_eq!(config.port, Some(4444));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.address.is_none());
        assert!(config.port.is_none());
    }

    #[test]
    fn test_resolve_cli_beats_file() {
        let file = Config {
            address: Some("10.0.0.7".to_string()),
            port: Some(4444),
        };
        let (address, port) = resolve(Some("10.0.0.8".to_string()), Some(5555), file);
        assert_eq!(address, "10.0.0.8");
        assert_eq!(port, 5555);
    }

    #[test]
    fn test_resolve_file_beats_default() {
        let file = Config {
            address: Some("10.0.0.7".to_string()),
            port: Some(4444),
        };
        let (address, port) = resolve(None, None, file);
        assert_eq!(address, "10.0.0.7");
        assert_eq!(port, 4444);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let (address, port) = resolve(None, None, Config::default());
        assert_eq!(address, DEFAULT_ADDRESS);
        assert_eq!(port, DEFAULT_PORT);
    }

    #[test]
    fn test_resolve_fields_are_independent() {
        // Address from CLI, port from file
        let file = Config {
            address: Some("10.0.0.7".to_string()),
            port: Some(4444),
        };
        let (address, port) = resolve(Some("10.0.0.8".to_string()), None, file);
        assert_eq!(address, "10.0.0.8");
        assert_eq!(port, 4444);

        // Address from file, port from CLI
        let file = Config {
            address: Some("10.0.0.7".to_string()),
            port: None,
        };
        let (address, port) = resolve(None, Some(5555), file);
        assert_eq!(address, "10.0.0.7");
        assert_eq!(port, 5555);
    }
}
