//! Client configuration for fnroutes
//!
//! # Resolution Priority
//!
//! For the API URL:
//! 1. `--api-url` flag or `API_URL` environment variable
//! 2. `api_url` in `config.toml` inside the config directory
//! 3. `http://localhost:8080`
//!
//! For config_dir():
//! 1. `FNROUTES_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/fnroutes` (if set)
//! 3. `~/.config/fnroutes`

use anyhow::{Context, Result};
use routekit::backend::http::DEFAULT_API_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "FNROUTES_CONFIG_DIR";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the fnroutes config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("fnroutes");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("fnroutes");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Contents of `config.toml`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Base URL of the functions API
    #[serde(default)]
    pub api_url: Option<String>,
}

impl ConfigFile {
    /// Load config.toml from the config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(CONFIG_FILE))
    }

    /// Load a config file from an explicit path, or defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }
}

/// Effective client settings after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    /// Layer the flag/env value over the config file and the default
    pub fn resolve(flag: Option<String>, file: &ConfigFile) -> Self {
        let api_url = flag
            .filter(|u| !u.is_empty())
            .or_else(|| file.api_url.clone().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join(CONFIG_FILE)).unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "api_url = \"https://fn.example.com\"\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://fn.example.com"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "api_url = ").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_resolve_flag_wins() {
        let file = ConfigFile {
            api_url: Some("https://file.example.com".to_string()),
        };
        let config = ClientConfig::resolve(Some("https://flag.example.com/".to_string()), &file);
        assert_eq!(config.api_url, "https://flag.example.com");
    }

    #[test]
    fn test_resolve_file_then_default() {
        let file = ConfigFile {
            api_url: Some("https://file.example.com".to_string()),
        };
        assert_eq!(
            ClientConfig::resolve(None, &file).api_url,
            "https://file.example.com"
        );
        assert_eq!(
            ClientConfig::resolve(Some(String::new()), &ConfigFile::default()).api_url,
            DEFAULT_API_URL
        );
    }
}
