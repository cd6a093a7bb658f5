//! Domain layer - pure business logic with no I/O.
//!
//! Everything here is deterministic given its inputs (randomness enters
//! only through the [`foundation::RandomSource`] seam), which is what keeps
//! the scoring and prompt logic testable without providers.

pub mod evaluation;
pub mod foundation;
pub mod persona;
pub mod prompt;
pub mod transcript;
