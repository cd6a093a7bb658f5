//! Fixed evaluation criteria table and result types.
//!
//! The shape is invariant: 14 leaf criteria grouped into 5 dimensions
//! (4/3/3/3/1). Criterion ids are 1-based and stable across sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Score, Timestamp};

/// Number of leaf criteria.
pub const CRITERION_COUNT: usize = 14;

/// Number of dimensions.
pub const DIMENSION_COUNT: usize = 5;

/// One of the five fixed groupings of criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Communication,
    OwnProduct,
    Competitor,
    CustomerInsight,
    Methodology,
}

impl Dimension {
    /// All dimensions in canonical display order.
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Communication,
        Dimension::OwnProduct,
        Dimension::Competitor,
        Dimension::CustomerInsight,
        Dimension::Methodology,
    ];

    /// Chinese display name shown to mentors and trainees.
    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Communication => "沟通能力",
            Dimension::OwnProduct => "本品知识",
            Dimension::Competitor => "竞品知识",
            Dimension::CustomerInsight => "客户洞察",
            Dimension::Methodology => "方法论运用",
        }
    }

    /// Ids of the member criteria, in table order.
    pub fn criterion_ids(&self) -> &'static [u8] {
        match self {
            Dimension::Communication => &[1, 2, 3, 4],
            Dimension::OwnProduct => &[5, 6, 7],
            Dimension::Competitor => &[8, 9, 10],
            Dimension::CustomerInsight => &[11, 12, 13],
            Dimension::Methodology => &[14],
        }
    }

    /// Resolves a dimension from a serialized id, a Chinese display name,
    /// or a loose variant of either.
    pub fn from_name(name: &str) -> Option<Dimension> {
        let trimmed = name.trim();
        Dimension::ALL.into_iter().find(|d| {
            d.serialized_name() == trimmed
                || d.display_name() == trimmed
                || trimmed.contains(d.display_name())
        })
    }

    fn serialized_name(&self) -> &'static str {
        match self {
            Dimension::Communication => "communication",
            Dimension::OwnProduct => "own_product",
            Dimension::Competitor => "competitor",
            Dimension::CustomerInsight => "customer_insight",
            Dimension::Methodology => "methodology",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Static definition of one leaf criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriterionSpec {
    pub id: u8,
    pub name: &'static str,
    pub dimension: Dimension,
}

/// The fixed 14-criterion table. Index = id - 1.
pub const CRITERIA: [CriterionSpec; CRITERION_COUNT] = [
    CriterionSpec { id: 1, name: "开场与破冰", dimension: Dimension::Communication },
    CriterionSpec { id: 2, name: "倾听与提问", dimension: Dimension::Communication },
    CriterionSpec { id: 3, name: "表达清晰度", dimension: Dimension::Communication },
    CriterionSpec { id: 4, name: "异议处理", dimension: Dimension::Communication },
    CriterionSpec { id: 5, name: "产品卖点阐述", dimension: Dimension::OwnProduct },
    CriterionSpec { id: 6, name: "产品知识准确性", dimension: Dimension::OwnProduct },
    CriterionSpec { id: 7, name: "价值呈现", dimension: Dimension::OwnProduct },
    CriterionSpec { id: 8, name: "竞品了解程度", dimension: Dimension::Competitor },
    CriterionSpec { id: 9, name: "差异化对比", dimension: Dimension::Competitor },
    CriterionSpec { id: 10, name: "竞品异议应对", dimension: Dimension::Competitor },
    CriterionSpec { id: 11, name: "需求挖掘", dimension: Dimension::CustomerInsight },
    CriterionSpec { id: 12, name: "客户画像把握", dimension: Dimension::CustomerInsight },
    CriterionSpec { id: 13, name: "个性化方案", dimension: Dimension::CustomerInsight },
    CriterionSpec { id: 14, name: "方法论执行", dimension: Dimension::Methodology },
];

impl CriterionSpec {
    /// Looks up a criterion by its 1-based id.
    pub fn by_id(id: u8) -> Option<&'static CriterionSpec> {
        CRITERIA.get(usize::from(id).checked_sub(1)?)
    }

    /// Looks up a criterion by display name.
    pub fn by_name(name: &str) -> Option<&'static CriterionSpec> {
        let trimmed = name.trim();
        CRITERIA.iter().find(|c| c.name == trimmed)
    }
}

/// One scored leaf criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub id: u8,
    pub name: String,
    pub score: Score,
    #[serde(default)]
    pub feedback: String,
    /// Verbatim excerpt from the transcript supporting the score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl EvaluationCriterion {
    /// Creates a criterion from its static spec.
    pub fn from_spec(spec: &CriterionSpec, score: Score, feedback: impl Into<String>) -> Self {
        Self {
            id: spec.id,
            name: spec.name.to_string(),
            score,
            feedback: feedback.into(),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Dimension membership, derived from the fixed table.
    pub fn dimension(&self) -> Option<Dimension> {
        CriterionSpec::by_id(self.id).map(|spec| spec.dimension)
    }
}

/// Aggregate score for one dimension with its ordered criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    #[serde(rename = "name")]
    pub dimension: Dimension,
    pub score: Score,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub criteria: Vec<EvaluationCriterion>,
}

/// The structured, scored evaluation of one role-play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub overall_score: Score,
    pub dimensions: Vec<DimensionScore>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    pub evaluated_at: Timestamp,
}

impl EvaluationResult {
    /// All leaf criteria across dimensions, in table order.
    pub fn criteria(&self) -> impl Iterator<Item = &EvaluationCriterion> {
        self.dimensions.iter().flat_map(|d| d.criteria.iter())
    }

    /// True when the result carries the full fixed shape.
    pub fn has_full_shape(&self) -> bool {
        self.dimensions.len() == DIMENSION_COUNT
            && self.criteria().count() == CRITERION_COUNT
    }
}
