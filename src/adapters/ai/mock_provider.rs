//! Mock AI provider for testing.
//!
//! Queued responses, simulated latency, error injection, and call tracking,
//! so gateway and pipeline tests run without real provider APIs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
};

/// Configurable mock provider.
#[derive(Debug, Clone)]
pub struct MockAiProvider {
    /// Pre-configured responses, consumed in order.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// One queued mock outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Injectable error kinds, mirroring [`AiError`] without carrying the
/// non-Clone real type in the queue.
#[derive(Debug, Clone)]
pub enum MockError {
    Timeout { timeout_secs: u64 },
    Network { message: String },
    AuthenticationFailed,
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    Parse { message: String },
}

impl From<MockError> for AiError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::Timeout { timeout_secs } => AiError::Timeout { timeout_secs },
            MockError::Network { message } => AiError::network(message),
            MockError::AuthenticationFailed => AiError::AuthenticationFailed,
            MockError::RateLimited { retry_after_secs } => AiError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AiError::unavailable(message),
            MockError::Parse { message } => AiError::parse(message),
        }
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful completion.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .push_back(MockResponse::Success {
                content: content.into(),
                finish_reason: FinishReason::Stop,
            });
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: MockError) -> Self {
        self.responses
            .lock()
            .expect("mock responses lock poisoned")
            .push_back(MockResponse::Error(error));
        self
    }

    /// Simulates per-request latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Number of completed calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock calls lock poisoned").len()
    }

    /// Copies of all requests seen so far.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .push(request);

        let next = self
            .responses
            .lock()
            .expect("mock responses lock poisoned")
            .pop_front();

        match next {
            Some(MockResponse::Success {
                content,
                finish_reason,
            }) => Ok(CompletionResponse {
                content,
                model: self.info.model.clone(),
                finish_reason,
            }),
            Some(MockResponse::Error(err)) => Err(err.into()),
            // Empty queue answers with a neutral canned line.
            None => Ok(CompletionResponse {
                content: "好的,请继续。".to_string(),
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
