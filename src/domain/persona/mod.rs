//! Persona module - Customer archetypes and recommendation.
//!
//! A static, read-only catalog of customer archetypes with weighted
//! attributes, plus the engine that scores the catalog against a caller's
//! partial attribute query.

mod archetype;
mod catalog;
mod recommend;

pub use archetype::{AgeRange, CommunicationStyle, GenderDistribution, PersonaArchetype};
pub use catalog::PersonaCatalog;
pub use recommend::{RecommendationEngine, RecommendationQuery, RecommendationResult};
