//! Session evaluation use case.
//!
//! Builds the mentor prompt from the fixed criteria table, asks the gateway
//! for a structured evaluation, and normalizes whatever comes back. When
//! the output is irrecoverable the grounded default evaluation stands in,
//! so the trainee always receives a scorecard.

use tracing::{info, warn};

use crate::adapters::ai::ProviderGateway;
use crate::domain::evaluation::{
    Dimension, EvaluationAggregator, EvaluationResult, ResponseNormalizer, CRITERIA,
};
use crate::domain::prompt::{PromptSynthesizer, ScenarioConfig, ScenarioRequest, SynthesizedPrompt};
use crate::domain::transcript::Transcript;
use crate::ports::{ChatMessage, CompletionRequest};

/// Generation parameters for evaluation calls. Low temperature: scoring
/// should be as reproducible as the model allows.
const EVALUATION_MAX_TOKENS: u32 = 2000;
const EVALUATION_TEMPERATURE: f32 = 0.2;

/// Outcome of evaluating one session.
#[derive(Debug, Clone)]
pub struct SessionEvaluation {
    /// The customer prompt the session ran under, for audit context.
    pub prompt: SynthesizedPrompt,
    pub result: EvaluationResult,
    /// True when the model output was unusable and the default evaluation
    /// was substituted.
    pub used_default: bool,
}

/// Evaluates finished role-play sessions.
pub struct SessionEvaluator {
    synthesizer: PromptSynthesizer,
    gateway: ProviderGateway,
    normalizer: ResponseNormalizer,
    aggregator: EvaluationAggregator,
}

impl SessionEvaluator {
    pub fn new(
        synthesizer: PromptSynthesizer,
        gateway: ProviderGateway,
        normalizer: ResponseNormalizer,
    ) -> Self {
        Self {
            synthesizer,
            gateway,
            normalizer,
            aggregator: EvaluationAggregator::new(),
        }
    }

    /// Scores a finished session. Infallible: provider failure and
    /// malformed output both degrade to the default evaluation.
    pub async fn evaluate(
        &self,
        request: &ScenarioRequest,
        transcript: &Transcript,
    ) -> SessionEvaluation {
        let scenario = ScenarioConfig::from_request(request);
        let prompt = self.synthesizer.synthesize(&scenario);

        let completion = CompletionRequest::new(vec![ChatMessage::user(format!(
            "以下是本次销售角色扮演的完整对话记录:\n\n{}\n\n请按要求输出评估JSON。",
            transcript.render_dialogue()
        ))])
        .with_system_prompt(evaluation_prompt(&scenario, &prompt))
        .with_max_tokens(EVALUATION_MAX_TOKENS)
        .with_temperature(EVALUATION_TEMPERATURE);

        let raw = self.gateway.generate(completion).await;

        match self.normalizer.normalize(&raw) {
            Some(result) => {
                info!(overall = result.overall_score.value(), "session evaluated");
                SessionEvaluation {
                    prompt,
                    result,
                    used_default: false,
                }
            }
            None => {
                warn!("evaluation output unusable, substituting default evaluation");
                SessionEvaluation {
                    prompt,
                    result: self.aggregator.default_evaluation(transcript),
                    used_default: true,
                }
            }
        }
    }
}

/// Mentor system prompt: scoring rubric, scenario context, and the exact
/// JSON shape expected back.
fn evaluation_prompt(scenario: &ScenarioConfig, prompt: &SynthesizedPrompt) -> String {
    let mut text = String::new();
    text.push_str("你是一位资深销售培训导师,负责评估一场销售角色扮演训练。\n\n");

    text.push_str("## 训练背景\n");
    text.push_str(&format!("训练任务:{}\n", scenario.task_goal()));
    if let Some(methodology) = scenario.methodology() {
        text.push_str(&format!("要求运用的方法论:{methodology}\n"));
    }
    text.push_str(&format!("客户人设(id: {}):\n{}\n", prompt.persona_id, prompt.text));
    text.push('\n');

    text.push_str("## 评分标准\n");
    text.push_str("对销售(标记为\"销售\")的表现按以下14项标准逐项打分,每项0-100分:\n");
    for dimension in Dimension::ALL {
        text.push_str(&format!("### {}\n", dimension.display_name()));
        for spec in CRITERIA.iter().filter(|c| c.dimension == dimension) {
            text.push_str(&format!("{}. {}\n", spec.id, spec.name));
        }
    }
    text.push('\n');

    text.push_str("## 输出格式\n");
    text.push_str("只输出一个JSON对象,不要任何额外文字,结构如下:\n");
    text.push_str(concat!(
        "{\"overallScore\": 85, \"dimensions\": [{\"name\": \"沟通能力\", \"score\": 85, ",
        "\"feedback\": \"...\", \"criteria\": [{\"id\": 1, \"name\": \"开场与破冰\", ",
        "\"score\": 85, \"feedback\": \"...\", \"evidence\": \"引用对话原文\"}]}], ",
        "\"suggestions\": [\"...\"], \"strengths\": [\"...\"]}\n",
    ));
    text.push_str("每个维度必须包含其全部标准,分数一律使用0-100的整数。\n");
    text
}
