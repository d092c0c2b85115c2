// Configuration - load settings from config.toml
//
// Provides sensible defaults if the config file is missing or has errors.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kindling".to_string(),
            width: 1024,
            height: 768,
            fullscreen: false,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Request the D3D11 debug layer. Only honored in debug builds.
    pub debug_layer: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self { debug_layer: true }
    }
}

impl Config {
    /// Load configuration from config.toml, falling back to defaults
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {e}. Using defaults.");
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {path:?}, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path:?}"))?;

        log::info!("Loaded configuration from {path:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bootstrap_window() {
        let config = Config::default();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 768);
        assert!(!config.window.fullscreen);
        assert!(config.debug.debug_layer);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config: Config = toml::from_str(
            r#"
            [window]
            title = "demo"
            fullscreen = true
            "#,
        )
        .unwrap();
        assert_eq!(config.window.title, "demo");
        assert!(config.window.fullscreen);
        assert_eq!(config.window.width, 1024);
        assert!(config.debug.debug_layer);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.window.title, "Kindling");
    }
}
