//! Recommendation engine - weighted scoring of the catalog against a query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::archetype::CommunicationStyle;
use super::catalog::PersonaCatalog;

/// Weight of a profession substring match.
const WEIGHT_PROFESSION: f64 = 0.30;
/// Weight of the personality-list overlap fraction.
const WEIGHT_PERSONALITY: f64 = 0.25;
/// Weight of the focus-point overlap fraction.
const WEIGHT_FOCUS: f64 = 0.20;
/// Weight of an exact communication-style match.
const WEIGHT_STYLE: f64 = 0.15;
/// Weight of age-in-range membership.
const WEIGHT_AGE: f64 = 0.10;

/// Partial caller attributes to match against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationQuery {
    pub profession: Option<String>,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub focus_points: Vec<String>,
    pub communication_style: Option<CommunicationStyle>,
    pub age: Option<u8>,
}

impl RecommendationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }

    pub fn with_personality(mut self, personality: Vec<String>) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_focus_points(mut self, focus_points: Vec<String>) -> Self {
        self.focus_points = focus_points;
        self
    }

    pub fn with_communication_style(mut self, style: CommunicationStyle) -> Self {
        self.communication_style = Some(style);
        self
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    /// True when no attribute is set at all.
    pub fn is_empty(&self) -> bool {
        self.profession.is_none()
            && self.personality.is_empty()
            && self.focus_points.is_empty()
            && self.communication_style.is_none()
            && self.age.is_none()
    }
}

/// Outcome of scoring the catalog against one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Id of the best-scoring archetype.
    pub archetype_id: String,
    /// Best score, in `[0, 1]`. Callers apply their own threshold.
    pub confidence: f64,
    /// Score per archetype id, for diagnostics and threshold tuning.
    pub scores: BTreeMap<String, f64>,
}

/// Scores the catalog against a caller's partial attribute query.
///
/// Always returns a pick for a non-empty catalog, even for an empty query
/// (confidence near zero); trusting the pick is the caller's decision.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<PersonaCatalog>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<PersonaCatalog>) -> Self {
        Self { catalog }
    }

    /// Weighted linear scoring over five factors; argmax over the catalog,
    /// ties resolving to catalog order. `None` only for an empty catalog.
    pub fn recommend(&self, query: &RecommendationQuery) -> Option<RecommendationResult> {
        let mut scores = BTreeMap::new();
        let mut best: Option<(&str, f64)> = None;

        for archetype in self.catalog.archetypes() {
            let mut score = 0.0;

            if let Some(ref profession) = query.profession {
                if archetype.profession_matches(profession) {
                    score += WEIGHT_PROFESSION;
                }
            }
            score += WEIGHT_PERSONALITY * archetype.trait_overlap(&query.personality);
            score += WEIGHT_FOCUS * archetype.focus_overlap(&query.focus_points);
            if query.communication_style == Some(archetype.communication_style) {
                score += WEIGHT_STYLE;
            }
            if let Some(age) = query.age {
                if archetype.age_range.contains(age) {
                    score += WEIGHT_AGE;
                }
            }

            scores.insert(archetype.id.clone(), score);
            // Strictly greater keeps the earliest archetype on ties.
            if best.map_or(true, |(_, current)| score > current) {
                best = Some((&archetype.id, score));
            }
        }

        best.map(|(id, confidence)| RecommendationResult {
            archetype_id: id.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            scores,
        })
    }
}
