//! Score value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer evaluation score between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    /// Zero points.
    pub const ZERO: Self = Self(0);

    /// Full marks.
    pub const HUNDRED: Self = Self(100);

    /// Neutral score used by the default evaluation.
    pub const NEUTRAL: Self = Self(75);

    /// Creates a new Score, clamping to the valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Score from a float by rounding, clamping to 0-100.
    pub fn from_f64(value: f64) -> Self {
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    /// Rounded mean of a slice of scores. Empty input yields zero.
    pub fn rounded_mean(scores: &[Score]) -> Self {
        if scores.is_empty() {
            return Self::ZERO;
        }
        let sum: u32 = scores.iter().map(|s| u32::from(s.0)).sum();
        Self::from_f64(f64::from(sum) / scores.len() as f64)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a fraction (0.0 to 1.0).
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_new_accepts_valid_values() {
        assert_eq!(Score::new(0).value(), 0);
        assert_eq!(Score::new(75).value(), 75);
        assert_eq!(Score::new(100).value(), 100);
    }

    #[test]
    fn score_new_clamps_to_100() {
        assert_eq!(Score::new(101).value(), 100);
        assert_eq!(Score::new(255).value(), 100);
    }

    #[test]
    fn score_from_f64_rounds() {
        assert_eq!(Score::from_f64(79.5).value(), 80);
        assert_eq!(Score::from_f64(79.4).value(), 79);
        assert_eq!(Score::from_f64(-3.0).value(), 0);
        assert_eq!(Score::from_f64(120.0).value(), 100);
    }

    #[test]
    fn score_rounded_mean_of_equal_values_is_fixpoint() {
        let scores = vec![Score::new(80); 14];
        assert_eq!(Score::rounded_mean(&scores).value(), 80);
    }

    #[test]
    fn score_rounded_mean_rounds_half_up() {
        let scores = vec![Score::new(70), Score::new(71)];
        assert_eq!(Score::rounded_mean(&scores).value(), 71);
    }

    #[test]
    fn score_rounded_mean_empty_is_zero() {
        assert_eq!(Score::rounded_mean(&[]), Score::ZERO);
    }

    #[test]
    fn score_serializes_transparently() {
        let json = serde_json::to_string(&Score::new(42)).unwrap();
        assert_eq!(json, "42");
        let score: Score = serde_json::from_str("75").unwrap();
        assert_eq!(score.value(), 75);
    }

    #[test]
    fn score_as_fraction_converts() {
        assert!((Score::new(50).as_fraction() - 0.5).abs() < f64::EPSILON);
    }
}
