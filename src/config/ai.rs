//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Request timeout bounds in seconds.
const MIN_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 60;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Alicloud DashScope API key
    pub alicloud_api_key: Option<String>,
    /// Alicloud base URL override
    pub alicloud_base_url: Option<String>,
    /// Alicloud model override (default: qwen-plus)
    pub alicloud_model: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI base URL override
    pub openai_base_url: Option<String>,
    /// OpenAI model override
    pub openai_model: Option<String>,

    /// Kimi (Moonshot) API key
    pub kimi_api_key: Option<String>,
    /// Kimi base URL override
    pub kimi_base_url: Option<String>,
    /// Kimi model override
    pub kimi_model: Option<String>,

    /// Primary AI provider
    #[serde(default)]
    pub primary_provider: ProviderKind,

    /// Fallback AI provider
    pub fallback_provider: Option<ProviderKind>,

    /// Request timeout in seconds (30-60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum in-adapter retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// Supported AI providers
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Alicloud,
    OpenAi,
    Kimi,
}

impl AiConfig {
    /// Timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_alicloud(&self) -> bool {
        self.alicloud_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    pub fn has_kimi(&self) -> bool {
        self.kimi_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Whether the given provider has credentials.
    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Alicloud => self.has_alicloud(),
            ProviderKind::OpenAi => self.has_openai(),
            ProviderKind::Kimi => self.has_kimi(),
        }
    }

    /// Validate AI configuration
    ///
    /// A missing key for the named primary is tolerated as long as some
    /// provider is configured; the gateway promotes whatever is available.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_alicloud() && !self.has_openai() && !self.has_kimi() {
            return Err(ValidationError::NoAiProviderConfigured);
        }
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            alicloud_api_key: None,
            alicloud_base_url: None,
            alicloud_model: None,
            openai_api_key: None,
            openai_base_url: None,
            openai_model: None,
            kimi_api_key: None,
            kimi_base_url: None,
            kimi_model: None,
            primary_provider: ProviderKind::default(),
            fallback_provider: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_timeout() -> u64 {
    45
}

fn default_retries() -> u32 {
    2
}
