//! Game rule constants.

/// Seconds a team has to produce the required answers.
pub const TIME_LIMIT_SECONDS: i64 = 30;

/// Correct answers needed to clear one question.
pub const REQUIRED_ANSWERS: usize = 5;

/// Minimum canonical answers a question document must carry for this mode.
pub const MIN_ANSWERS_PER_QUESTION: usize = 5;

/// Player slots in a room; `current_turn` rotates over these.
pub const MAX_PLAYERS: u32 = 5;
