// ABOUTME: Configuration module for the carousel-slides application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{CarouselError, Result};
use crate::export::ExportConfig;
use crate::render::RenderConfig;
use std::env;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 3333;

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub llm_timeout_ms: u64,
    pub port: u16,
    pub cors_origin: String,
    pub browser_path: Option<String>,
    pub default_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            llm_timeout_ms: 60000,
            port: DEFAULT_PORT,
            cors_origin: "*".to_string(),
            browser_path: None,
            default_timeout_ms: 30000, // 30 seconds
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Empty values count as unset;
    /// numbers that do not parse are a `ConfigError`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_base_url = value("OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.openai_base_url);

        Ok(Self {
            openai_api_key: value("OPENAI_API_KEY"),
            openai_model: value("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url,
            llm_timeout_ms: parse_number(value("LLM_TIMEOUT_MS"), "LLM_TIMEOUT_MS")?
                .unwrap_or(defaults.llm_timeout_ms),
            port: parse_number(value("PORT"), "PORT")?.unwrap_or(defaults.port),
            cors_origin: value("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            browser_path: value("BROWSER_PATH"),
            default_timeout_ms: parse_number(value("DEFAULT_TIMEOUT_MS"), "DEFAULT_TIMEOUT_MS")?
                .unwrap_or(defaults.default_timeout_ms),
        })
    }

    /// Get a render configuration with defaults from this config
    pub fn get_render_config(&self, pixel_ratio: Option<f64>, timeout_ms: Option<u64>) -> RenderConfig {
        let defaults = RenderConfig::default();
        RenderConfig {
            pixel_ratio: pixel_ratio.unwrap_or(defaults.pixel_ratio),
            timeout_ms: timeout_ms.unwrap_or(self.default_timeout_ms),
            browser_path: self.browser_path.clone(),
            ..defaults
        }
    }

    /// Get an export configuration with defaults
    pub fn get_export_config(&self, file_prefix: Option<String>, include_cover: bool) -> ExportConfig {
        let defaults = ExportConfig::default();
        ExportConfig {
            file_prefix: file_prefix.unwrap_or(defaults.file_prefix),
            include_cover,
            ..defaults
        }
    }
}

fn parse_number<T: FromStr>(raw: Option<String>, key: &str) -> Result<Option<T>> {
    raw.map(|raw| {
        raw.trim().parse::<T>().map_err(|_| {
            CarouselError::ConfigError(format!("{} must be a non-negative integer, got {:?}", key, raw))
        })
    })
    .transpose()
}
