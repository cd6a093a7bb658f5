//! Foundation module - Shared domain primitives.
//!
//! Value objects and seams that form the vocabulary of the
//! sales-training domain.

mod random;
mod score;
mod timestamp;

pub use random::{FixedRandom, RandomSource, UuidEntropy};
pub use score::Score;
pub use timestamp::Timestamp;
