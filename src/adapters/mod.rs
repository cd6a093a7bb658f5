//! Adapters - implementations of ports against the outside world.

pub mod ai;
