//! Provider gateway - failover front for the configured providers.
//!
//! The gateway is the only AI surface the application layer sees. It tries
//! the primary provider, fails over to the secondary on ANY error (each
//! adapter has already spent its retry budget on transient failures), and
//! on exhaustion answers with a canned customer reply. A session therefore
//! never stalls because a provider is down.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::ai::alicloud_provider::{AlicloudConfig, AlicloudProvider};
use crate::adapters::ai::kimi_provider::{KimiConfig, KimiProvider};
use crate::adapters::ai::openai_provider::{OpenAiConfig, OpenAiProvider};
use crate::config::{AiConfig, ProviderKind, ValidationError};
use crate::domain::foundation::RandomSource;
use crate::ports::{AiProvider, CompletionRequest};

/// Canned customer replies used when every provider has failed. Written to
/// keep the role-play moving without committing the "customer" to anything.
const DEFAULT_REPLIES: [&str; 5] = [
    "这个问题我需要再考虑一下,你能再详细介绍一下吗?",
    "嗯,听起来有点意思,不过我还有些疑虑。",
    "你说的这些我大概了解了,价格方面怎么样?",
    "我平时比较忙,你挑重点讲讲吧。",
    "这个跟我之前了解的同类产品比,有什么不一样?",
];

/// Failover gateway over one or two providers.
pub struct ProviderGateway {
    primary: Arc<dyn AiProvider>,
    secondary: Option<Arc<dyn AiProvider>>,
    rng: Arc<dyn RandomSource>,
}

impl ProviderGateway {
    pub fn new(primary: Arc<dyn AiProvider>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            primary,
            secondary: None,
            rng,
        }
    }

    pub fn with_fallback(mut self, secondary: Arc<dyn AiProvider>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Builds the gateway from configuration.
    ///
    /// Provider order is primary, then fallback, then any other configured
    /// provider; unconfigured entries are skipped, so a missing primary key
    /// promotes the next configured provider. Errors only when no provider
    /// has credentials at all.
    pub fn from_config(
        config: &AiConfig,
        rng: Arc<dyn RandomSource>,
    ) -> Result<Self, ValidationError> {
        let mut order = vec![config.primary_provider];
        if let Some(fallback) = config.fallback_provider {
            order.push(fallback);
        }
        for kind in [ProviderKind::Alicloud, ProviderKind::OpenAi, ProviderKind::Kimi] {
            if !order.contains(&kind) {
                order.push(kind);
            }
        }

        let mut configured = order
            .into_iter()
            .filter(|kind| config.has_provider(*kind));

        let primary = configured
            .next()
            .map(|kind| build_provider(kind, config))
            .ok_or(ValidationError::NoAiProviderConfigured)?;
        let secondary = configured.next().map(|kind| build_provider(kind, config));

        Ok(Self {
            primary,
            secondary,
            rng,
        })
    }

    /// Generates the customer's next reply. Infallible: any provider error
    /// degrades to the next provider and finally to a canned reply.
    pub async fn generate(&self, request: CompletionRequest) -> String {
        let primary_info = self.primary.provider_info();
        match self.primary.complete(request.clone()).await {
            Ok(response) => return response.content,
            Err(err) => {
                warn!(
                    provider = %primary_info.name,
                    model = %primary_info.model,
                    error = %err,
                    "primary provider failed"
                );
            }
        }

        if let Some(ref secondary) = self.secondary {
            let secondary_info = secondary.provider_info();
            info!(
                from = %primary_info.name,
                to = %secondary_info.name,
                "failing over to secondary provider"
            );
            match secondary.complete(request).await {
                Ok(response) => return response.content,
                Err(err) => {
                    warn!(
                        provider = %secondary_info.name,
                        model = %secondary_info.model,
                        error = %err,
                        "secondary provider failed"
                    );
                }
            }
        }

        warn!("all providers exhausted, using canned reply");
        self.canned_reply()
    }

    fn canned_reply(&self) -> String {
        self.rng
            .pick(&DEFAULT_REPLIES)
            .copied()
            .unwrap_or(DEFAULT_REPLIES[0])
            .to_string()
    }
}

fn build_provider(kind: ProviderKind, config: &AiConfig) -> Arc<dyn AiProvider> {
    let timeout = config.timeout();
    match kind {
        ProviderKind::Alicloud => {
            let key = config.alicloud_api_key.clone().unwrap_or_default();
            let mut provider_config = AlicloudConfig::new(key)
                .with_timeout(timeout)
                .with_max_retries(config.max_retries);
            if let Some(ref url) = config.alicloud_base_url {
                provider_config = provider_config.with_base_url(url.clone());
            }
            if let Some(ref model) = config.alicloud_model {
                provider_config = provider_config.with_model(model.clone());
            }
            Arc::new(AlicloudProvider::new(provider_config))
        }
        ProviderKind::OpenAi => {
            let key = config.openai_api_key.clone().unwrap_or_default();
            let mut provider_config = OpenAiConfig::new(key)
                .with_timeout(timeout)
                .with_max_retries(config.max_retries);
            if let Some(ref url) = config.openai_base_url {
                provider_config = provider_config.with_base_url(url.clone());
            }
            if let Some(ref model) = config.openai_model {
                provider_config = provider_config.with_model(model.clone());
            }
            Arc::new(OpenAiProvider::new(provider_config))
        }
        ProviderKind::Kimi => {
            let key = config.kimi_api_key.clone().unwrap_or_default();
            let mut provider_config = KimiConfig::new(key)
                .with_timeout(timeout)
                .with_max_retries(config.max_retries);
            if let Some(ref url) = config.kimi_base_url {
                provider_config = provider_config.with_base_url(url.clone());
            }
            if let Some(ref model) = config.kimi_model {
                provider_config = provider_config.with_model(model.clone());
            }
            Arc::new(KimiProvider::new(provider_config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::mock_provider::{MockAiProvider, MockError};
    use crate::domain::foundation::FixedRandom;
    use crate::ports::ChatMessage;
    use std::sync::Mutex;

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::user("你好")])
    }

    fn rng() -> Arc<dyn RandomSource> {
        Arc::new(FixedRandom(0))
    }

    /// Collects formatted log output so tests can assert on emitted events.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn primary_success_needs_no_fallback() {
        let primary = MockAiProvider::new().with_response("欢迎光临");
        let secondary = MockAiProvider::new().with_response("不该用到");
        let secondary_handle = secondary.clone();

        let gateway = ProviderGateway::new(Arc::new(primary), rng())
            .with_fallback(Arc::new(secondary));

        assert_eq!(gateway.generate(request()).await, "欢迎光临");
        assert_eq!(secondary_handle.call_count(), 0);
    }

    #[tokio::test]
    async fn primary_failure_falls_over_to_secondary() {
        let primary = MockAiProvider::new().with_error(MockError::Unavailable {
            message: "502".into(),
        });
        let secondary = MockAiProvider::new().with_response("我来接着聊");

        let gateway = ProviderGateway::new(Arc::new(primary), rng())
            .with_fallback(Arc::new(secondary));

        assert_eq!(gateway.generate(request()).await, "我来接着聊");
    }

    #[tokio::test]
    async fn failover_logs_exactly_one_event() {
        let primary = MockAiProvider::new().with_error(MockError::Unavailable {
            message: "502".into(),
        });
        let secondary = MockAiProvider::new().with_response("我来接着聊");
        let gateway = ProviderGateway::new(Arc::new(primary), rng())
            .with_fallback(Arc::new(secondary));

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        assert_eq!(gateway.generate(request()).await, "我来接着聊");

        let output = logs.contents();
        assert_eq!(output.matches("failing over to secondary provider").count(), 1);
        assert_eq!(output.matches("primary provider failed").count(), 1);
        assert!(!output.contains("all providers exhausted"));
    }

    #[tokio::test]
    async fn non_retryable_error_still_fails_over() {
        // Parse errors are not retryable in-adapter but must not kill the session.
        let primary = MockAiProvider::new().with_error(MockError::Parse {
            message: "bad json".into(),
        });
        let secondary = MockAiProvider::new().with_response("没关系,继续");

        let gateway = ProviderGateway::new(Arc::new(primary), rng())
            .with_fallback(Arc::new(secondary));

        assert_eq!(gateway.generate(request()).await, "没关系,继续");
    }

    #[tokio::test]
    async fn exhausted_providers_yield_canned_reply() {
        let primary = MockAiProvider::new().with_error(MockError::Timeout { timeout_secs: 45 });
        let secondary = MockAiProvider::new().with_error(MockError::AuthenticationFailed);

        let gateway = ProviderGateway::new(Arc::new(primary), rng())
            .with_fallback(Arc::new(secondary));

        let reply = gateway.generate(request()).await;
        assert!(DEFAULT_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn no_secondary_goes_straight_to_canned_reply() {
        let primary = MockAiProvider::new().with_error(MockError::Network {
            message: "refused".into(),
        });
        let gateway = ProviderGateway::new(Arc::new(primary), Arc::new(FixedRandom(3)));

        assert_eq!(gateway.generate(request()).await, DEFAULT_REPLIES[3]);
    }

    #[test]
    fn from_config_requires_some_provider() {
        let config = AiConfig::default();
        assert!(matches!(
            ProviderGateway::from_config(&config, rng()),
            Err(ValidationError::NoAiProviderConfigured)
        ));
    }

    #[test]
    fn from_config_promotes_configured_provider() {
        // Primary (alicloud by default) has no key; kimi is promoted.
        let config = AiConfig {
            kimi_api_key: Some("sk-kimi".into()),
            ..Default::default()
        };
        let gateway = ProviderGateway::from_config(&config, rng()).unwrap();
        assert_eq!(gateway.primary.provider_info().name, "kimi");
        assert!(gateway.secondary.is_none());
    }

    #[test]
    fn from_config_wires_primary_and_fallback() {
        let config = AiConfig {
            alicloud_api_key: Some("sk-ali".into()),
            openai_api_key: Some("sk-oai".into()),
            fallback_provider: Some(ProviderKind::OpenAi),
            ..Default::default()
        };
        let gateway = ProviderGateway::from_config(&config, rng()).unwrap();
        assert_eq!(gateway.primary.provider_info().name, "alicloud");
        assert_eq!(
            gateway.secondary.as_ref().map(|p| p.provider_info().name),
            Some("openai".to_string())
        );
    }
}
