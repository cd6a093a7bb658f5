//! Customer archetype value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an archetype prefers to communicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    /// Blunt, fast, low small-talk tolerance.
    Direct,
    /// Warm, relationship-oriented.
    Amiable,
    /// Data-driven, detail-seeking.
    Analytical,
    /// Enthusiastic, story-driven.
    Expressive,
}

impl CommunicationStyle {
    /// Chinese display label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            CommunicationStyle::Direct => "直接干脆",
            CommunicationStyle::Amiable => "亲和友善",
            CommunicationStyle::Analytical => "理性分析",
            CommunicationStyle::Expressive => "热情健谈",
        }
    }
}

impl fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CommunicationStyle {
    type Err = ();

    /// Accepts both English identifiers and the Chinese labels callers send.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "direct" | "直接" | "直接干脆" => Ok(CommunicationStyle::Direct),
            "amiable" | "友善" | "亲和" | "亲和友善" => Ok(CommunicationStyle::Amiable),
            "analytical" | "理性" | "分析" | "理性分析" => Ok(CommunicationStyle::Analytical),
            "expressive" | "热情" | "健谈" | "热情健谈" => Ok(CommunicationStyle::Expressive),
            _ => Err(()),
        }
    }
}

/// Inclusive age interval for an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u8,
    pub max: u8,
}

impl AgeRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn contains(&self, age: u8) -> bool {
        age >= self.min && age <= self.max
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}岁", self.min, self.max)
    }
}

/// Gender split of the archetype population, as a male fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderDistribution {
    male_ratio: f32,
}

impl GenderDistribution {
    pub fn new(male_ratio: f32) -> Self {
        Self {
            male_ratio: male_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn male_ratio(&self) -> f32 {
        self.male_ratio
    }

    pub fn female_ratio(&self) -> f32 {
        1.0 - self.male_ratio
    }

    /// Coarse Chinese description used in prompts.
    pub fn describe(&self) -> &'static str {
        if self.male_ratio >= 0.65 {
            "男性为主"
        } else if self.male_ratio <= 0.35 {
            "女性为主"
        } else {
            "男女均衡"
        }
    }
}

/// A pre-authored customer profile template seeding role-play.
///
/// Immutable; the catalog builds every archetype once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaArchetype {
    pub id: String,
    pub name: String,
    pub description: String,
    pub traits: Vec<String>,
    pub professions: Vec<String>,
    pub communication_style: CommunicationStyle,
    pub decision_style: String,
    pub focus_points: Vec<String>,
    pub age_range: AgeRange,
    pub gender: GenderDistribution,
    pub hobbies: Vec<String>,
    /// Standing behavior directives appended to every prompt for this persona.
    pub directives: Vec<String>,
}

impl PersonaArchetype {
    /// Checks whether any catalog profession matches the query by substring,
    /// in either direction ("医生" matches "儿科医生").
    pub fn profession_matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        self.professions
            .iter()
            .any(|p| p.contains(query) || query.contains(p.as_str()))
    }

    /// Fraction of the given attribute list covered by this archetype's traits.
    pub fn trait_overlap(&self, attributes: &[String]) -> f64 {
        overlap_fraction(&self.traits, attributes)
    }

    /// Fraction of the given focus list covered by this archetype's focus points.
    pub fn focus_overlap(&self, focus: &[String]) -> f64 {
        overlap_fraction(&self.focus_points, focus)
    }
}

fn overlap_fraction(ours: &[String], theirs: &[String]) -> f64 {
    if theirs.is_empty() {
        return 0.0;
    }
    let matched = theirs
        .iter()
        .filter(|attr| ours.iter().any(|own| own == *attr))
        .count();
    matched as f64 / theirs.len() as f64
}
