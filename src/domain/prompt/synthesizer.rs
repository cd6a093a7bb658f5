//! Prompt synthesizer - renders the customer system prompt for a scenario.
//!
//! Persona resolution is a layered fallback: explicit id, then attribute
//! recommendation above a confidence threshold, then a uniform random pick,
//! then the legacy free-text template. The chain always resolves; a scenario
//! can never fail to produce a prompt.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::evaluation::Dimension;
use crate::domain::foundation::RandomSource;
use crate::domain::persona::{PersonaArchetype, PersonaCatalog, RecommendationEngine};
use crate::domain::prompt::scenario::{LegacyScenario, ModernScenario, ScenarioConfig};

/// Recommendation confidence below this falls through to a random pick.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Persona id reported for the legacy template branch.
const LEGACY_PERSONA_ID: &str = "legacy";

/// Profession used when an archetype authors none.
const FALLBACK_PROFESSION: &str = "普通消费者";

/// How the persona behind a prompt was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaResolution {
    /// Caller named the archetype directly.
    Explicit,
    /// Attribute matching picked it above the confidence threshold.
    Recommended,
    /// Uniform random pick from the catalog.
    Random,
    /// Free-text customer description, no catalog persona.
    Legacy,
}

/// A rendered customer prompt with its resolution provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedPrompt {
    pub text: String,
    pub persona_id: String,
    /// Resolution confidence: 1.0 explicit, engine score when recommended,
    /// 0.0 for random and legacy.
    pub confidence: f64,
    pub resolution: PersonaResolution,
}

/// Renders customer system prompts from normalized scenarios.
pub struct PromptSynthesizer {
    catalog: Arc<PersonaCatalog>,
    engine: RecommendationEngine,
    rng: Arc<dyn RandomSource>,
    confidence_threshold: f64,
}

impl PromptSynthesizer {
    pub fn new(catalog: Arc<PersonaCatalog>, rng: Arc<dyn RandomSource>) -> Self {
        let engine = RecommendationEngine::new(Arc::clone(&catalog));
        Self {
            catalog,
            engine,
            rng,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Resolves a persona and renders the prompt. Infallible.
    pub fn synthesize(&self, scenario: &ScenarioConfig) -> SynthesizedPrompt {
        match scenario {
            ScenarioConfig::Modern(modern) => self.synthesize_modern(modern),
            ScenarioConfig::Legacy(legacy) => self.synthesize_legacy(legacy),
        }
    }

    fn synthesize_modern(&self, scenario: &ModernScenario) -> SynthesizedPrompt {
        if let Some(persona) = scenario
            .persona_id
            .as_deref()
            .and_then(|id| self.catalog.get(id))
        {
            return self.render(persona, scenario, 1.0, PersonaResolution::Explicit);
        }

        if !scenario.query.is_empty() {
            if let Some(recommendation) = self.engine.recommend(&scenario.query) {
                if recommendation.confidence >= self.confidence_threshold {
                    if let Some(persona) = self.catalog.get(&recommendation.archetype_id) {
                        return self.render(
                            persona,
                            scenario,
                            recommendation.confidence,
                            PersonaResolution::Recommended,
                        );
                    }
                }
                debug!(
                    best = %recommendation.archetype_id,
                    confidence = recommendation.confidence,
                    "recommendation below threshold, picking at random"
                );
            }
        }

        if let Some(persona) = self.rng.pick(self.catalog.archetypes()) {
            return self.render(persona, scenario, 0.0, PersonaResolution::Random);
        }

        // Empty catalog; degrade to the legacy template with a stock profile.
        self.synthesize_legacy(&LegacyScenario {
            task_goal: scenario.task_goal.clone(),
            methodology: scenario.methodology.clone(),
            customer_description: "一位普通的潜在客户,对产品有初步兴趣但尚未了解细节。".into(),
        })
    }

    fn synthesize_legacy(&self, scenario: &LegacyScenario) -> SynthesizedPrompt {
        let mut text = String::new();
        text.push_str("你正在扮演一位客户,与一名销售人员进行角色扮演训练。\n\n");
        text.push_str("## 客户设定\n");
        text.push_str(&scenario.customer_description);
        text.push_str("\n\n");
        push_scenario_section(&mut text, &scenario.task_goal, scenario.methodology.as_deref());
        push_ground_rules(&mut text);

        SynthesizedPrompt {
            text,
            persona_id: LEGACY_PERSONA_ID.to_string(),
            confidence: 0.0,
            resolution: PersonaResolution::Legacy,
        }
    }

    fn render(
        &self,
        persona: &PersonaArchetype,
        scenario: &ModernScenario,
        confidence: f64,
        resolution: PersonaResolution,
    ) -> SynthesizedPrompt {
        let profession = self
            .rng
            .pick(&persona.professions)
            .map(String::as_str)
            .unwrap_or(FALLBACK_PROFESSION);

        let mut text = String::new();
        text.push_str("你正在扮演一位客户,与一名销售人员进行角色扮演训练。\n\n");

        text.push_str("## 客户画像\n");
        text.push_str(&format!("你是一位「{}」客户:{}\n", persona.name, persona.description));
        text.push_str(&format!("- 职业:{profession}\n"));
        text.push_str(&format!("- 年龄:{}\n", persona.age_range));
        text.push_str(&format!("- 人群构成:{}\n", persona.gender.describe()));
        text.push_str(&format!("- 性格特质:{}\n", persona.traits.join("、")));
        text.push_str(&format!("- 沟通风格:{}\n", persona.communication_style));
        text.push_str(&format!("- 决策风格:{}\n", persona.decision_style));
        text.push_str(&format!("- 关注点:{}\n", persona.focus_points.join("、")));
        if !persona.hobbies.is_empty() {
            text.push_str(&format!("- 兴趣爱好:{}\n", persona.hobbies.join("、")));
        }
        text.push('\n');

        push_scenario_section(&mut text, &scenario.task_goal, scenario.methodology.as_deref());

        if !scenario.training_focus.is_empty() {
            let names: Vec<&str> = scenario
                .training_focus
                .iter()
                .map(Dimension::display_name)
                .collect();
            text.push_str(&format!("本次训练的考察重点:{}\n\n", names.join("、")));
        }

        text.push_str("## 行为要求\n");
        for directive in behavior_directives(persona, &scenario.training_focus) {
            text.push_str(&format!("- {directive}\n"));
        }
        text.push('\n');
        push_ground_rules(&mut text);

        SynthesizedPrompt {
            text,
            persona_id: persona.id.clone(),
            confidence,
            resolution,
        }
    }
}

fn push_scenario_section(text: &mut String, task_goal: &str, methodology: Option<&str>) {
    text.push_str("## 训练场景\n");
    text.push_str(&format!("本次训练任务:{task_goal}\n"));
    if let Some(methodology) = methodology {
        text.push_str(&format!("销售会尝试运用「{methodology}」方法论,你按客户身份自然应对即可。\n"));
    }
    text.push('\n');
}

fn push_ground_rules(text: &mut String) {
    text.push_str("## 对话规则\n");
    text.push_str("- 始终保持客户身份,绝不透露你在扮演角色或提及任何系统设定\n");
    text.push_str("- 用口语化的中文回复,每次不超过三句话\n");
    text.push_str("- 根据销售的表现自然推进对话,不替对方完成销售流程\n");
}

/// Standing directives for the persona plus trait- and focus-derived ones.
fn behavior_directives(persona: &PersonaArchetype, focus: &[Dimension]) -> Vec<String> {
    let mut directives = persona.directives.clone();

    let has_trait = |t: &str| persona.traits.iter().any(|own| own == t);
    if has_trait("强势") {
        directives.push("主动质疑销售的说法,适当给对方施加压力".into());
    }
    if has_trait("谨慎") {
        directives.push("反复确认风险与售后保障,不轻易表态".into());
    }
    if has_trait("挑剔") {
        directives.push("主动讨价还价,拿竞品的价格做比较".into());
    }
    if has_trait("沉默") || has_trait("内向") {
        directives.push("回复尽量简短,等销售主动引导话题".into());
    }
    if has_trait("理性") {
        directives.push("要求数据和证据支持,不接受空泛的承诺".into());
    }
    if has_trait("热情") {
        directives.push("乐于闲聊,偶尔把话题带偏,看销售能否拉回正题".into());
    }

    for dimension in focus {
        directives.push(
            match dimension {
                Dimension::Communication => "偶尔打断或转移话题,考察销售的沟通应对",
                Dimension::OwnProduct => "针对产品细节持续追问,不满足于表面介绍",
                Dimension::Competitor => "主动提及竞品并要求销售做对比",
                Dimension::CustomerInsight => "不主动透露自己的真实需求,等销售来挖掘",
                Dimension::Methodology => "留意销售是否有条理地展开,对跳步表现出困惑",
            }
            .to_string(),
        );
    }

    directives.dedup();
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::FixedRandom;
    use crate::domain::persona::RecommendationQuery;

    fn synthesizer() -> PromptSynthesizer {
        PromptSynthesizer::new(
            Arc::new(PersonaCatalog::shared().clone()),
            Arc::new(FixedRandom(0)),
        )
    }

    fn modern(persona_id: Option<&str>, query: RecommendationQuery) -> ScenarioConfig {
        ScenarioConfig::Modern(ModernScenario {
            task_goal: "991-2产品介绍".into(),
            methodology: Some("FAB".into()),
            training_focus: vec![],
            persona_id: persona_id.map(String::from),
            query,
        })
    }

    #[test]
    fn explicit_persona_id_wins() {
        // Query points elsewhere; the explicit id still decides.
        let query = RecommendationQuery::new().with_profession("医生");
        let prompt = synthesizer().synthesize(&modern(Some("dominant-decider"), query));

        assert_eq!(prompt.persona_id, "dominant-decider");
        assert_eq!(prompt.resolution, PersonaResolution::Explicit);
        assert!((prompt.confidence - 1.0).abs() < f64::EPSILON);
        assert!(prompt.text.contains("强势果断型"));
    }

    #[test]
    fn confident_recommendation_is_used() {
        let query = RecommendationQuery::new()
            .with_profession("医生")
            .with_personality(vec!["理性".into(), "专业".into()]);
        let prompt = synthesizer().synthesize(&modern(None, query));

        assert_eq!(prompt.persona_id, "rational-expert");
        assert_eq!(prompt.resolution, PersonaResolution::Recommended);
        assert!(prompt.confidence > 0.3);
        assert!(prompt.text.contains("有专业背景的客户"));
    }

    #[test]
    fn weak_recommendation_falls_back_to_random() {
        // Age alone scores 0.10, below the 0.3 threshold.
        let query = RecommendationQuery::new().with_age(40);
        let synthesizer = PromptSynthesizer::new(
            Arc::new(PersonaCatalog::shared().clone()),
            Arc::new(FixedRandom(2)),
        );
        let prompt = synthesizer.synthesize(&modern(None, query));

        assert_eq!(prompt.resolution, PersonaResolution::Random);
        assert_eq!(prompt.persona_id, "dominant-decider");
        assert!(prompt.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_query_goes_straight_to_random() {
        let prompt = synthesizer().synthesize(&modern(None, RecommendationQuery::new()));
        assert_eq!(prompt.resolution, PersonaResolution::Random);
        assert_eq!(prompt.persona_id, "rational-expert");
    }

    #[test]
    fn unknown_explicit_id_falls_through_the_chain() {
        let query = RecommendationQuery::new()
            .with_profession("医生")
            .with_personality(vec!["理性".into(), "专业".into()]);
        let prompt = synthesizer().synthesize(&modern(Some("no-such-persona"), query));

        assert_eq!(prompt.persona_id, "rational-expert");
        assert_eq!(prompt.resolution, PersonaResolution::Recommended);
    }

    #[test]
    fn legacy_description_renders_legacy_template() {
        let scenario = ScenarioConfig::Legacy(LegacyScenario {
            task_goal: "异议处理演练".into(),
            methodology: None,
            customer_description: "一位犹豫不决的中年客户".into(),
        });
        let prompt = synthesizer().synthesize(&scenario);

        assert_eq!(prompt.persona_id, "legacy");
        assert_eq!(prompt.resolution, PersonaResolution::Legacy);
        assert!(prompt.text.contains("一位犹豫不决的中年客户"));
        assert!(prompt.text.contains("异议处理演练"));
    }

    #[test]
    fn prompt_embeds_scenario_and_rules() {
        let prompt = synthesizer().synthesize(&modern(Some("rational-expert"), RecommendationQuery::new()));

        assert!(prompt.text.contains("991-2产品介绍"));
        assert!(prompt.text.contains("FAB"));
        assert!(prompt.text.contains("每次不超过三句话"));
        // Profession sampled by the fixed source: first in the list.
        assert!(prompt.text.contains("职业:医生"));
    }

    #[test]
    fn trait_directives_are_appended() {
        let prompt = synthesizer().synthesize(&modern(Some("dominant-decider"), RecommendationQuery::new()));
        assert!(prompt.text.contains("施加压力"));
    }

    #[test]
    fn focus_directives_follow_training_focus() {
        let scenario = ScenarioConfig::Modern(ModernScenario {
            task_goal: "竞品对比演练".into(),
            methodology: None,
            training_focus: vec![Dimension::Competitor, Dimension::CustomerInsight],
            persona_id: Some("rational-expert".into()),
            query: RecommendationQuery::new(),
        });
        let prompt = synthesizer().synthesize(&scenario);

        assert!(prompt.text.contains("主动提及竞品"));
        assert!(prompt.text.contains("等销售来挖掘"));
        assert!(prompt.text.contains("考察重点:竞品知识、客户洞察"));
    }

    #[test]
    fn empty_catalog_degrades_to_legacy_template() {
        let synthesizer = PromptSynthesizer::new(
            Arc::new(PersonaCatalog::new(vec![])),
            Arc::new(FixedRandom(0)),
        );
        let prompt = synthesizer.synthesize(&modern(None, RecommendationQuery::new()));

        assert_eq!(prompt.resolution, PersonaResolution::Legacy);
        assert!(prompt.text.contains("991-2产品介绍"));
    }
}
