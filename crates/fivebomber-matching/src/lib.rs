//! Five Bomber — answer text canonicalization and matching.
//!
//! Pure, stateless functions with no I/O. Both halves are infallible: every
//! input string yields a result, never an error.

pub mod matcher;
pub mod normalizer;

pub use matcher::{MatchOutcome, match_answer};
pub use normalizer::{normalize, to_half_width, to_hiragana, to_katakana};
