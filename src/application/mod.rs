//! Application layer - use cases orchestrating domain logic and adapters.

mod evaluate_session;
mod roleplay;

pub use evaluate_session::{SessionEvaluation, SessionEvaluator};
pub use roleplay::{CustomerSimulator, CustomerTurn};
