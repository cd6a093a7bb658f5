//! Score aggregation and the grounded default evaluation.

use crate::domain::evaluation::criteria::{
    CriterionSpec, Dimension, DimensionScore, EvaluationCriterion, EvaluationResult, CRITERIA,
};
use crate::domain::foundation::{Score, Timestamp};
use crate::domain::transcript::{SpeakerRole, Transcript};

/// Criteria scoring below this feed the suggestion list.
const SUGGESTION_THRESHOLD: u8 = 70;

/// Criteria scoring at or above this feed the strength list.
const STRENGTH_THRESHOLD: u8 = 85;

/// Maximum evidence excerpt length in characters.
const EVIDENCE_EXCERPT_CHARS: usize = 60;

/// Maps 14 leaf criteria into 5 dimensions and an overall score.
///
/// Purely computational; built once at startup and shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationAggregator;

impl EvaluationAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregates leaf criteria into the fixed 5-dimension shape.
    ///
    /// Dimension score = rounded mean of its members; overall = rounded mean
    /// of all 14 leaves (not of the dimension scores). Criteria missing from
    /// the input are filled at the neutral score so the shape stays total.
    pub fn aggregate(&self, criteria: Vec<EvaluationCriterion>) -> EvaluationResult {
        let complete = Self::complete_criteria(criteria);

        let leaf_scores: Vec<Score> = complete.iter().map(|c| c.score).collect();
        let overall = Score::rounded_mean(&leaf_scores);

        let dimensions = Dimension::ALL
            .iter()
            .map(|dimension| {
                let members: Vec<EvaluationCriterion> = dimension
                    .criterion_ids()
                    .iter()
                    .filter_map(|id| complete.iter().find(|c| c.id == *id).cloned())
                    .collect();
                let member_scores: Vec<Score> = members.iter().map(|c| c.score).collect();
                let score = Score::rounded_mean(&member_scores);
                DimensionScore {
                    dimension: *dimension,
                    score,
                    feedback: dimension_feedback(*dimension, score),
                    criteria: members,
                }
            })
            .collect();

        let suggestions = complete
            .iter()
            .filter(|c| c.score.value() < SUGGESTION_THRESHOLD)
            .map(|c| format!("{}:{}", c.name, improvement_hint(c.id)))
            .collect();
        let strengths = complete
            .iter()
            .filter(|c| c.score.value() >= STRENGTH_THRESHOLD)
            .map(|c| c.name.clone())
            .collect();

        EvaluationResult {
            overall_score: overall,
            dimensions,
            suggestions,
            strengths,
            evaluated_at: Timestamp::now(),
        }
    }

    /// Produces the default evaluation used when no usable model output
    /// exists: every criterion at the neutral score, library feedback per
    /// dimension, and evidence excerpts pulled from the real transcript so
    /// the result is grounded in the actual conversation.
    pub fn default_evaluation(&self, transcript: &Transcript) -> EvaluationResult {
        let criteria = CRITERIA
            .iter()
            .map(|spec| {
                let mut criterion = EvaluationCriterion::from_spec(
                    spec,
                    Score::NEUTRAL,
                    default_criterion_feedback(spec.dimension),
                );
                if let Some(evidence) = find_evidence(spec.id, transcript) {
                    criterion = criterion.with_evidence(evidence);
                }
                criterion
            })
            .collect();

        let mut result = self.aggregate(criteria);
        result.suggestions = default_suggestions();
        result
    }

    /// Fills criteria missing from the input with the neutral score, and
    /// drops entries whose id is outside the fixed table.
    fn complete_criteria(provided: Vec<EvaluationCriterion>) -> Vec<EvaluationCriterion> {
        CRITERIA
            .iter()
            .map(|spec| {
                provided
                    .iter()
                    .find(|c| c.id == spec.id)
                    .cloned()
                    .unwrap_or_else(|| {
                        EvaluationCriterion::from_spec(
                            spec,
                            Score::NEUTRAL,
                            default_criterion_feedback(spec.dimension),
                        )
                    })
            })
            .collect()
    }
}

/// Library feedback for a dimension at a given score band.
fn dimension_feedback(dimension: Dimension, score: Score) -> String {
    let band = match score.value() {
        85..=100 => "表现优秀,继续保持",
        70..=84 => "整体良好,仍有提升空间",
        50..=69 => "有明显短板,需要针对性练习",
        _ => "表现薄弱,建议重点复盘",
    };
    format!("{}:{}。", dimension.display_name(), band)
}

/// Fixed neutral feedback used by the default evaluation.
fn default_criterion_feedback(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Communication => "本次未能生成针对性点评,沟通表现按中性水平记录。",
        Dimension::OwnProduct => "本次未能生成针对性点评,本品知识表现按中性水平记录。",
        Dimension::Competitor => "本次未能生成针对性点评,竞品应对表现按中性水平记录。",
        Dimension::CustomerInsight => "本次未能生成针对性点评,客户洞察表现按中性水平记录。",
        Dimension::Methodology => "本次未能生成针对性点评,方法论执行按中性水平记录。",
    }
}

/// Per-criterion improvement hints for the suggestion list.
fn improvement_hint(criterion_id: u8) -> &'static str {
    match criterion_id {
        1 => "开场先建立信任,再切入产品话题",
        2 => "多用开放式提问,确认客户真实想法",
        3 => "用结构化表达,先结论后展开",
        4 => "先共情客户的顾虑,再给出回应",
        5 => "卖点要对准客户关注点,而不是全面罗列",
        6 => "补齐产品参数与原理,避免含糊其辞",
        7 => "把功能转译成客户能感知的收益",
        8 => "补充主流竞品的基本盘信息",
        9 => "对比要落在可验证的差异点上",
        10 => "遇到竞品话题不要回避,正面回应",
        11 => "先挖需求再推方案,避免自说自话",
        12 => "留意客户身份和场景信息并加以利用",
        13 => "把方案和客户的具体情况绑定",
        _ => "按方法论的步骤完整走完流程",
    }
}

fn default_suggestions() -> Vec<String> {
    vec![
        "本次为系统默认评分,建议结合导师点评进行复盘。".to_string(),
        "回听录音,检查开场、需求挖掘和竞品应对三个环节。".to_string(),
        "按所选方法论逐步骤自查,标记缺失的环节。".to_string(),
    ]
}

/// Searches the transcript for an excerpt supporting one criterion, using
/// per-criterion keyword and speaker-role heuristics.
fn find_evidence(criterion_id: u8, transcript: &Transcript) -> Option<String> {
    let (role, keywords) = evidence_rule(criterion_id);
    transcript
        .turns()
        .iter()
        .filter(|turn| turn.role == role)
        .find(|turn| keywords.iter().any(|kw| turn.message.contains(kw)))
        .map(|turn| excerpt(&turn.message))
}

/// Which speaker to search and for which keywords, per criterion.
fn evidence_rule(criterion_id: u8) -> (SpeakerRole, &'static [&'static str]) {
    match criterion_id {
        1 => (SpeakerRole::Trainee, &["您好", "你好", "打扰", "认识", "初次"]),
        2 => (SpeakerRole::Trainee, &["?", "?", "请问", "您觉得", "怎么看"]),
        3 => (SpeakerRole::Trainee, &["首先", "其次", "总结", "简单来说", "也就是说"]),
        4 => (SpeakerRole::Trainee, &["理解您", "您放心", "顾虑", "担心", "其实"]),
        5 => (SpeakerRole::Trainee, &["产品", "功效", "特点", "优势", "卖点"]),
        6 => (SpeakerRole::Trainee, &["成分", "数据", "原理", "规格", "参数"]),
        7 => (SpeakerRole::Trainee, &["价值", "帮助", "效果", "收益", "节省"]),
        8 => (SpeakerRole::Trainee, &["竞品", "对比", "其他品牌", "别家", "友商", "同类"]),
        9 => (SpeakerRole::Trainee, &["不同", "区别", "相比", "差异", "独特"]),
        10 => (SpeakerRole::Trainee, &["竞品", "别家", "他们家", "不如", "优于"]),
        11 => (SpeakerRole::Trainee, &["需要", "需求", "希望", "期望", "目前"]),
        // Customer-profile grasp is evidenced by what the customer revealed.
        12 => (SpeakerRole::Customer, &["我平时", "我们", "习惯", "一般", "通常"]),
        13 => (SpeakerRole::Trainee, &["为您", "建议", "方案", "适合", "推荐"]),
        _ => (SpeakerRole::Trainee, &["优势", "利益", "特点", "证明", "场景"]),
    }
}

/// Truncates a message to a short, char-safe excerpt.
fn excerpt(message: &str) -> String {
    let mut out: String = message.chars().take(EVIDENCE_EXCERPT_CHARS).collect();
    if message.chars().count() > EVIDENCE_EXCERPT_CHARS {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transcript::TranscriptTurn;

    fn all_at(value: u8) -> Vec<EvaluationCriterion> {
        CRITERIA
            .iter()
            .map(|spec| EvaluationCriterion::from_spec(spec, Score::new(value), "点评"))
            .collect()
    }

    #[test]
    fn constant_criteria_are_a_fixpoint() {
        let result = EvaluationAggregator::new().aggregate(all_at(80));

        assert_eq!(result.overall_score.value(), 80);
        assert_eq!(result.dimensions.len(), 5);
        for dimension in &result.dimensions {
            assert_eq!(dimension.score.value(), 80);
        }
        assert!(result.has_full_shape());
    }

    #[test]
    fn dimension_score_is_rounded_mean_of_members() {
        let mut criteria = all_at(80);
        // Communication members are ids 1-4; set them to 70,71,80,80.
        criteria[0].score = Score::new(70);
        criteria[1].score = Score::new(71);

        let result = EvaluationAggregator::new().aggregate(criteria);
        let communication = &result.dimensions[0];
        // mean(70,71,80,80) = 75.25 -> 75
        assert_eq!(communication.score.value(), 75);
    }

    #[test]
    fn overall_is_mean_of_leaves_not_dimensions() {
        let mut criteria = all_at(100);
        // Only the single methodology criterion drops. A mean of dimension
        // scores would give 96; the leaf mean gives a different value.
        criteria[13].score = Score::new(30);

        let result = EvaluationAggregator::new().aggregate(criteria);
        // mean of leaves: (13*100 + 30) / 14 = 95
        assert_eq!(result.overall_score.value(), 95);
    }

    #[test]
    fn missing_criteria_are_filled_neutral() {
        let partial = vec![EvaluationCriterion::from_spec(
            &CRITERIA[0],
            Score::new(90),
            "很好",
        )];

        let result = EvaluationAggregator::new().aggregate(partial);
        assert!(result.has_full_shape());
        let filled = result.criteria().find(|c| c.id == 14).unwrap();
        assert_eq!(filled.score, Score::NEUTRAL);
    }

    #[test]
    fn low_scores_become_suggestions_high_scores_become_strengths() {
        let mut criteria = all_at(75);
        criteria[1].score = Score::new(50);
        criteria[4].score = Score::new(90);

        let result = EvaluationAggregator::new().aggregate(criteria);
        assert_eq!(result.suggestions.len(), 1);
        assert!(result.suggestions[0].starts_with("倾听与提问"));
        assert_eq!(result.strengths, vec!["产品卖点阐述".to_string()]);
    }

    #[test]
    fn default_evaluation_is_neutral_everywhere() {
        let result = EvaluationAggregator::new().default_evaluation(&Transcript::default());

        assert_eq!(result.overall_score, Score::NEUTRAL);
        assert!(result.has_full_shape());
        for criterion in result.criteria() {
            assert_eq!(criterion.score, Score::NEUTRAL);
            assert!(!criterion.feedback.is_empty());
        }
        assert!(!result.suggestions.is_empty());
    }

    #[test]
    fn default_evaluation_pulls_evidence_from_trainee_turns() {
        let transcript = Transcript::new(vec![
            TranscriptTurn::trainee("您好,我是顾问小李。"),
            TranscriptTurn::customer("你好。"),
            TranscriptTurn::trainee("和其他品牌对比,我们的竞品分析显示成分更安全。"),
        ]);

        let result = EvaluationAggregator::new().default_evaluation(&transcript);
        let competitor = result.criteria().find(|c| c.id == 8).unwrap();
        let evidence = competitor.evidence.as_deref().unwrap();
        assert!(evidence.contains("竞品") || evidence.contains("对比"));

        let opening = result.criteria().find(|c| c.id == 1).unwrap();
        assert!(opening.evidence.as_deref().unwrap().contains("您好"));
    }

    #[test]
    fn evidence_respects_speaker_role() {
        // Keyword appears only in a customer turn; trainee-scoped criteria
        // must not pick it up.
        let transcript = Transcript::new(vec![TranscriptTurn::customer(
            "你们和竞品对比怎么样?",
        )]);

        let result = EvaluationAggregator::new().default_evaluation(&transcript);
        let competitor = result.criteria().find(|c| c.id == 8).unwrap();
        assert!(competitor.evidence.is_none());
    }

    #[test]
    fn evidence_excerpt_is_truncated() {
        let long = "您好".repeat(100);
        let transcript = Transcript::new(vec![TranscriptTurn::trainee(long)]);

        let result = EvaluationAggregator::new().default_evaluation(&transcript);
        let opening = result.criteria().find(|c| c.id == 1).unwrap();
        let evidence = opening.evidence.as_deref().unwrap();
        assert!(evidence.chars().count() <= EVIDENCE_EXCERPT_CHARS + 1);
        assert!(evidence.ends_with('…'));
    }
}
