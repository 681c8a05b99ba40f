//! Score calculation.

/// Points awarded per correct answer.
pub const SCORE_PER_ANSWER: u32 = 10;

/// Bonus points per second left on the clock when the round completes.
pub const SCORE_PER_SECOND: u32 = 1;

/// Points for one correct answer.
#[must_use]
pub fn answer_score() -> u32 {
    SCORE_PER_ANSWER
}

/// Bonus for finishing with `remaining_seconds` on the clock. Negative
/// remainders (clock already lapsed) clamp to zero.
#[must_use]
pub fn time_bonus(remaining_seconds: i64) -> u32 {
    u32::try_from(remaining_seconds.max(0)).unwrap_or(u32::MAX) * SCORE_PER_SECOND
}

/// Total for a round: answer points plus time bonus.
#[must_use]
pub fn total_score(correct_answers: u32, remaining_seconds: i64) -> u32 {
    correct_answers * SCORE_PER_ANSWER + time_bonus(remaining_seconds)
}
