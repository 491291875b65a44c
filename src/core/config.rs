//! Configuration management

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            api: ApiConfig::default(),
            translate: TranslateConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("contentdesk");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from disk, writing defaults on first run
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Language for operator-facing messages: "auto", "es", "en"
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String { "auto".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// Content API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the admin content API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL of the public static content mirror (read-only fallback)
    #[serde(default = "default_static_url")]
    pub static_url: String,
    /// Shared admin token sent with write requests
    #[serde(default)]
    pub admin_token: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:3000".to_string() }
fn default_static_url() -> String { "http://localhost:3000/content".to_string() }
fn default_timeout_secs() -> u64 { 15 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            static_url: default_static_url(),
            admin_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation endpoint URL (LibreTranslate-compatible)
    #[serde(default = "default_translate_url")]
    pub api_url: String,
    /// Source language code
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    /// Target language code
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    /// Delay between consecutive backend calls in milliseconds.
    /// Courtesy rate limiting, not a correctness requirement.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_translate_url() -> String { "https://libretranslate.com/translate".to_string() }
fn default_source_lang() -> String { "es".to_string() }
fn default_target_lang() -> String { "en".to_string() }
fn default_delay_ms() -> u64 { 350 }

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            api_url: default_translate_url(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            delay_ms: default_delay_ms(),
        }
    }
}
