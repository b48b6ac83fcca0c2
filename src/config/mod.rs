// Configuration module

mod models;

pub use models::*;

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest)
    /// 2. Config file
    /// 3. Defaults (lowest)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(str::to_string)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(&path).required(config_path.is_some()))
            // Override with environment variables (prefix: GEMGATE_)
            .add_source(Environment::with_prefix("GEMGATE").separator("_"))
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let mut app: Self = config
            .try_deserialize()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        // GOOGLE_API_KEY is the conventional variable for this API; honor it
        // when no key was supplied through the config file.
        if app.gemini.api_key.as_deref().map_or(true, str::is_empty) {
            app.gemini.api_key = std::env::var("GOOGLE_API_KEY").ok();
        }

        Ok(app)
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemgate")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}
