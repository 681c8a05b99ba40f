//! Five Bomber — game session engine.
//!
//! Owns the per-round state machine: starting a round, judging submitted
//! answers, turn rotation, completion, and the externally-driven timeout.

pub mod engine;
pub mod rules;
pub mod score;
