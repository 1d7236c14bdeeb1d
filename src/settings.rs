//! Service settings
//!
//! Loaded from the environment with the `HUGINN_` prefix (a `.env` file is
//! read first when present). Every field has a working default except the
//! API key, which defaults to empty and fails engine initialization with a
//! configuration error until set.

use config::{Config, ConfigError, Environment};
use huginn_api::ApiConfig;
use huginn_core::EngineConfig;
use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> String {
    "http://localhost:8080,http://127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "sqlite://huginn.db".to_string()
}

fn default_gemini_model_id() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated CORS origins
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    /// Chat store location
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Gemini API key (empty means not configured)
    #[serde(default)]
    pub gemini_api_key: String,
    /// Gemini model identifier
    #[serde(default = "default_gemini_model_id")]
    pub gemini_model_id: String,
    /// Gemini API base URL (overridable for testing)
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,
    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
}

impl Settings {
    /// Load settings from the environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("HUGINN"))
            .build()?
            .try_deserialize()
    }

    /// Split the configured origins into a list
    pub fn allowed_origins_list(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Engine configuration for the chat service
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api_key: self.gemini_api_key.clone(),
            model_id: self.gemini_model_id.clone(),
            base_url: self.gemini_base_url.clone(),
        }
    }

    /// HTTP server configuration
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.host.clone(),
            port: self.port,
            version: env!("CARGO_PKG_VERSION").to_string(),
            allowed_origins: self.allowed_origins_list(),
        }
    }
}
