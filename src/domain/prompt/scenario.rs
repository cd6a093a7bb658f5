//! Scenario request DTO and its normalized internal form.
//!
//! Callers describe the training scenario in a loose camelCase shape with
//! two historical variants: the structured form (persona id or customer
//! attributes) and the legacy form carrying a free-text customer
//! description. The variant split happens once, here at the boundary, so
//! the synthesizer never inspects raw request fields.

use serde::{Deserialize, Serialize};

use crate::domain::evaluation::Dimension;
use crate::domain::persona::RecommendationQuery;

/// Raw scenario payload as callers send it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    /// What the trainee is practicing, e.g. "991-2产品介绍".
    pub task_goal: String,
    /// Sales methodology the trainee should apply, e.g. "FAB".
    pub methodology: Option<String>,
    /// Dimension names (ids or Chinese labels) the session focuses on.
    #[serde(default)]
    pub training_focus: Vec<String>,
    /// Explicit archetype choice; wins over attribute matching.
    pub persona_id: Option<String>,
    pub customer_profession: Option<String>,
    #[serde(default)]
    pub customer_personality: Vec<String>,
    #[serde(default)]
    pub customer_focus: Vec<String>,
    pub communication_style: Option<String>,
    pub customer_age: Option<u8>,
    /// Legacy free-text customer description; its presence selects the
    /// legacy template path.
    pub customer_description: Option<String>,
}

/// Normalized scenario, split by request generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioConfig {
    Modern(ModernScenario),
    Legacy(LegacyScenario),
}

/// Structured scenario driving persona resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ModernScenario {
    pub task_goal: String,
    pub methodology: Option<String>,
    pub training_focus: Vec<Dimension>,
    pub persona_id: Option<String>,
    pub query: RecommendationQuery,
}

/// Old-style scenario with a hand-written customer description.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyScenario {
    pub task_goal: String,
    pub methodology: Option<String>,
    pub customer_description: String,
}

impl ScenarioConfig {
    /// Normalizes a raw request. A present, non-blank customer description
    /// marks the legacy form; everything else is structured.
    pub fn from_request(request: &ScenarioRequest) -> Self {
        if let Some(description) = request
            .customer_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            return ScenarioConfig::Legacy(LegacyScenario {
                task_goal: request.task_goal.clone(),
                methodology: request.methodology.clone(),
                customer_description: description.to_string(),
            });
        }

        let mut query = RecommendationQuery::new()
            .with_personality(request.customer_personality.clone())
            .with_focus_points(request.customer_focus.clone());
        if let Some(ref profession) = request.customer_profession {
            query = query.with_profession(profession.clone());
        }
        // Unparseable style strings are dropped rather than rejected.
        if let Some(style) = request
            .communication_style
            .as_deref()
            .and_then(|s| s.parse().ok())
        {
            query = query.with_communication_style(style);
        }
        if let Some(age) = request.customer_age {
            query = query.with_age(age);
        }

        let training_focus = request
            .training_focus
            .iter()
            .filter_map(|name| Dimension::from_name(name))
            .collect();

        ScenarioConfig::Modern(ModernScenario {
            task_goal: request.task_goal.clone(),
            methodology: request.methodology.clone(),
            training_focus,
            persona_id: request.persona_id.clone(),
            query,
        })
    }

    pub fn task_goal(&self) -> &str {
        match self {
            ScenarioConfig::Modern(s) => &s.task_goal,
            ScenarioConfig::Legacy(s) => &s.task_goal,
        }
    }

    pub fn methodology(&self) -> Option<&str> {
        match self {
            ScenarioConfig::Modern(s) => s.methodology.as_deref(),
            ScenarioConfig::Legacy(s) => s.methodology.as_deref(),
        }
    }
}
