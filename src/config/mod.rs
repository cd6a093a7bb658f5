//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `PITCH_PERFECT_` prefix and nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use pitch_perfect::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod error;

pub use ai::{AiConfig, ProviderKind};
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// AI provider configuration (Alicloud/OpenAI/Kimi)
    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables with the
    /// `PITCH_PERFECT` prefix:
    ///
    /// - `PITCH_PERFECT__AI__ALICLOUD_API_KEY=sk-...` -> `ai.alicloud_api_key`
    /// - `PITCH_PERFECT__AI__PRIMARY_PROVIDER=kimi` -> `ai.primary_provider`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PITCH_PERFECT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        Ok(())
    }
}
