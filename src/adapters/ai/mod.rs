//! AI adapters - provider implementations and the failover gateway.

mod alicloud_provider;
mod gateway;
mod kimi_provider;
mod mock_provider;
mod openai_provider;

pub use alicloud_provider::{AlicloudConfig, AlicloudProvider};
pub use gateway::ProviderGateway;
pub use kimi_provider::{KimiConfig, KimiProvider};
pub use mock_provider::{MockAiProvider, MockError, MockResponse};
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
