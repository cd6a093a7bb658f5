//! Alicloud provider - chat completions against the DashScope API.
//!
//! DashScope wraps messages in an `input` object and parameters in a
//! `parameters` object; with `result_format: "message"` the reply arrives
//! under `output.choices`, while older models answer in `output.text`.
//! Both shapes are accepted.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::openai_provider::{backoff_delay, classify_send_error, wire_role};
use crate::ports::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
};

/// Configuration for the Alicloud DashScope provider.
#[derive(Debug, Clone)]
pub struct AlicloudConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl AlicloudConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "qwen-plus".to_string(),
            base_url: "https://dashscope.aliyuncs.com/api/v1".to_string(),
            timeout: Duration::from_secs(45),
            max_retries: 2,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// DashScope text-generation provider.
pub struct AlicloudProvider {
    config: AlicloudConfig,
    client: Client,
}

impl AlicloudProvider {
    pub fn new(config: AlicloudConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn generation_url(&self) -> String {
        format!(
            "{}/services/aigc/text-generation/generation",
            self.config.base_url
        )
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> DashScopeRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(DashScopeMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for message in &request.messages {
            messages.push(DashScopeMessage {
                role: wire_role(message.role).to_string(),
                content: message.content.clone(),
            });
        }

        DashScopeRequest {
            model: self.config.model.clone(),
            input: DashScopeInput { messages },
            parameters: DashScopeParameters {
                result_format: "message".to_string(),
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AiError> {
        self.client
            .post(self.generation_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.config.timeout))
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AiError> {
        let response = handle_dashscope_status(response).await?;

        let wire: DashScopeResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(format!("Failed to parse response: {e}")))?;

        let (content, finish_reason) = extract_output(wire.output)?;

        Ok(CompletionResponse {
            content,
            model: self.config.model.clone(),
            finish_reason,
        })
    }
}

#[async_trait]
impl AiProvider for AlicloudProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        let mut retry_count = 0;

        loop {
            let outcome = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(completion) => return Ok(completion),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    debug!(error = %err, retry = retry_count + 1, "dashscope request failed, retrying");
                    sleep(backoff_delay(retry_count)).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("alicloud", &self.config.model)
    }
}

/// DashScope reports errors with a `code` field even on some 200s handled
/// upstream; HTTP-level statuses map like the OpenAI-compatible ones.
async fn handle_dashscope_status(response: Response) -> Result<Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    match status.as_u16() {
        401 | 403 => Err(AiError::AuthenticationFailed),
        429 => Err(AiError::rate_limited(30)),
        400 => Err(AiError::invalid_request(error_body)),
        500..=599 => Err(AiError::unavailable(format!(
            "Server error {status}: {error_body}"
        ))),
        _ => Err(AiError::network(format!(
            "Unexpected status {status}: {error_body}"
        ))),
    }
}

fn extract_output(output: DashScopeOutput) -> Result<(String, FinishReason), AiError> {
    if let Some(choice) = output.choices.and_then(|choices| choices.into_iter().next()) {
        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };
        return Ok((choice.message.content, finish_reason));
    }
    if let Some(text) = output.text {
        return Ok((text, FinishReason::Stop));
    }
    Err(AiError::parse("No choices or text in DashScope output"))
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct DashScopeRequest {
    model: String,
    input: DashScopeInput,
    parameters: DashScopeParameters,
}

#[derive(Debug, Serialize)]
struct DashScopeInput {
    messages: Vec<DashScopeMessage>,
}

#[derive(Debug, Serialize)]
struct DashScopeParameters {
    result_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DashScopeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DashScopeResponse {
    output: DashScopeOutput,
}

#[derive(Debug, Deserialize)]
struct DashScopeOutput {
    #[serde(default)]
    choices: Option<Vec<DashScopeChoice>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashScopeChoice {
    message: DashScopeMessage,
    finish_reason: Option<String>,
}
