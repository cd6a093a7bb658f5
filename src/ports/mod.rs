//! Ports - interfaces the domain requires from the outside world.
//!
//! Adapters implement these traits; the application layer depends only on
//! the trait objects, never on a concrete provider.

pub mod ai_provider;

pub use ai_provider::{
    AiError, AiProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    MessageRole, ProviderInfo,
};
