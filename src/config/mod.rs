//! Configuration file management
//!
//! Loads TOML configuration files and provides renderer font settings.
//! Default config path: ~/.config/renfont/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::font::glyphset::AtlasLimits;

/// Renderer font settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Font settings
    pub font: FontConfig,
    /// Atlas growth settings
    pub atlas: AtlasConfig,
}

/// Font settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font file path (searches system fonts if empty)
    pub path: String,
    /// Font size in pixels
    pub size: f32,
    /// Tab advance in pixels (0 leaves tabs invisible)
    pub tab_width: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            size: 14.0,
            tab_width: 0,
        }
    }
}

/// Atlas growth settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Starting atlas dimension (square)
    pub initial_dim: usize,
    /// Largest atlas dimension before a bake fails
    pub max_dim: usize,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_dim: 128,
            max_dim: 4096,
        }
    }
}

impl AtlasConfig {
    pub fn limits(&self) -> AtlasLimits {
        AtlasLimits {
            initial_dim: self.initial_dim,
            max_dim: self.max_dim,
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/renfont/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. RENFONT_CONFIG environment variable
        if let Ok(path) = std::env::var("RENFONT_CONFIG") {
            let p = std::path::Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
        }

        // 2. User config: ~/.config/renfont/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("renfont").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/renfont/config.toml
        let system_config = std::path::Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. RENFONT_CONFIG environment variable
    /// 2. ~/.config/renfont/config.toml (user config)
    /// 3. /etc/renfont/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(path.to_string_lossy().as_ref()) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.font.path, "");
        assert_eq!(config.font.size, 14.0);
        assert_eq!(config.font.tab_width, 0);
        assert_eq!(config.atlas.initial_dim, 128);
        assert_eq!(config.atlas.max_dim, 4096);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str("[font]\nsize = 18.5\n").unwrap();
        assert_eq!(config.font.size, 18.5);
        // untouched sections keep their defaults
        assert_eq!(config.atlas.max_dim, 4096);
    }

    #[test]
    fn test_atlas_limits_mapping() {
        let config: Config = toml::from_str("[atlas]\ninitial_dim = 64\nmax_dim = 512\n").unwrap();
        let limits = config.atlas.limits();
        assert_eq!(limits.initial_dim, 64);
        assert_eq!(limits.max_dim, 512);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(toml::from_str::<Config>("font = 3").is_err());
    }
}
