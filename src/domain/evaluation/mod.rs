//! Evaluation module - criteria tables, aggregation, and model-output repair.

mod aggregator;
mod criteria;
mod normalizer;

pub use aggregator::EvaluationAggregator;
pub use criteria::{
    CriterionSpec, Dimension, DimensionScore, EvaluationCriterion, EvaluationResult, CRITERIA,
    CRITERION_COUNT, DIMENSION_COUNT,
};
pub use normalizer::{ResponseNormalizer, ValidationMode};
