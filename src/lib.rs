//! Pitch Perfect - evaluation core for AI role-play sales training.
//!
//! Simulates customer personas for sales role-play sessions and scores the
//! trainee's performance against a fixed 14-criterion rubric, with provider
//! failover so a session never stalls on a broken LLM backend.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
