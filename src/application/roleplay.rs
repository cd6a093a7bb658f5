//! Role-play use case - produces the simulated customer's next reply.

use tracing::debug;

use crate::adapters::ai::ProviderGateway;
use crate::domain::prompt::{PromptSynthesizer, ScenarioConfig, ScenarioRequest, SynthesizedPrompt};
use crate::domain::transcript::{SpeakerRole, Transcript};
use crate::ports::{ChatMessage, CompletionRequest};

/// Generation parameters for conversational replies.
const REPLY_MAX_TOKENS: u32 = 500;
const REPLY_TEMPERATURE: f32 = 0.8;

/// The customer's reply together with the prompt that produced it.
#[derive(Debug, Clone)]
pub struct CustomerTurn {
    pub content: String,
    pub prompt: SynthesizedPrompt,
}

/// Drives one simulated customer conversation turn.
pub struct CustomerSimulator {
    synthesizer: PromptSynthesizer,
    gateway: ProviderGateway,
}

impl CustomerSimulator {
    pub fn new(synthesizer: PromptSynthesizer, gateway: ProviderGateway) -> Self {
        Self {
            synthesizer,
            gateway,
        }
    }

    /// Produces the customer's next reply for the given scenario and
    /// conversation so far. Infallible: the gateway degrades to canned
    /// replies when providers fail.
    pub async fn reply(&self, request: &ScenarioRequest, transcript: &Transcript) -> CustomerTurn {
        let scenario = ScenarioConfig::from_request(request);
        let prompt = self.synthesizer.synthesize(&scenario);
        debug!(
            persona = %prompt.persona_id,
            resolution = ?prompt.resolution,
            "synthesized customer prompt"
        );

        let completion = CompletionRequest::new(chat_history(transcript))
            .with_system_prompt(prompt.text.clone())
            .with_max_tokens(REPLY_MAX_TOKENS)
            .with_temperature(REPLY_TEMPERATURE);

        let content = self.gateway.generate(completion).await;
        CustomerTurn { content, prompt }
    }
}

/// Trainee turns become user messages, customer turns assistant messages.
fn chat_history(transcript: &Transcript) -> Vec<ChatMessage> {
    transcript
        .turns()
        .iter()
        .map(|turn| match turn.role {
            SpeakerRole::Trainee => ChatMessage::user(turn.message.clone()),
            SpeakerRole::Customer => ChatMessage::assistant(turn.message.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::domain::foundation::FixedRandom;
    use crate::domain::persona::PersonaCatalog;
    use crate::domain::transcript::TranscriptTurn;
    use crate::ports::MessageRole;
    use std::sync::Arc;

    fn simulator(mock: MockAiProvider) -> CustomerSimulator {
        let catalog = Arc::new(PersonaCatalog::shared().clone());
        let synthesizer = PromptSynthesizer::new(catalog, Arc::new(FixedRandom(0)));
        let gateway = ProviderGateway::new(Arc::new(mock), Arc::new(FixedRandom(0)));
        CustomerSimulator::new(synthesizer, gateway)
    }

    fn scenario() -> ScenarioRequest {
        ScenarioRequest {
            task_goal: "991-2产品介绍".into(),
            methodology: Some("FAB".into()),
            customer_profession: Some("医生".into()),
            customer_personality: vec!["理性".into(), "专业".into()],
            ..ScenarioRequest::default()
        }
    }

    #[tokio::test]
    async fn reply_uses_synthesized_prompt_and_history() {
        let mock = MockAiProvider::new().with_response("你们的临床数据来自哪里?");
        let handle = mock.clone();
        let simulator = simulator(mock);

        let transcript: Transcript = vec![
            TranscriptTurn::trainee("您好,我是医药代表小李。"),
            TranscriptTurn::customer("你好,有什么事?"),
            TranscriptTurn::trainee("想向您介绍我们的新产品。"),
        ]
        .into_iter()
        .collect();

        let turn = simulator.reply(&scenario(), &transcript).await;

        assert_eq!(turn.content, "你们的临床数据来自哪里?");
        assert_eq!(turn.prompt.persona_id, "rational-expert");

        let calls = handle.calls();
        assert_eq!(calls.len(), 1);
        let request = &calls[0];
        assert!(request
            .system_prompt
            .as_deref()
            .is_some_and(|p| p.contains("理性专家型")));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[1].role, MessageRole::Assistant);
        assert_eq!(request.messages[2].content, "想向您介绍我们的新产品。");
    }

    #[tokio::test]
    async fn reply_survives_provider_failure() {
        let mock = MockAiProvider::new().with_error(crate::adapters::ai::MockError::Timeout {
            timeout_secs: 45,
        });
        let simulator = simulator(mock);

        let turn = simulator.reply(&scenario(), &Transcript::default()).await;
        assert!(!turn.content.is_empty());
    }
}
