//! Answer correctness decisions.

use std::collections::HashMap;

use crate::normalizer::{normalize, to_hiragana};

/// Result of judging one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Whether the input matched a canonical answer or accepted variation.
    pub is_correct: bool,
    /// The canonical answer credited with the match, verbatim from the
    /// question's answer list.
    pub matched_answer: Option<String>,
    /// The normalized form of the input, kept for logging and display.
    pub normalized_input: String,
}

impl MatchOutcome {
    fn incorrect(normalized_input: String) -> Self {
        Self {
            is_correct: false,
            matched_answer: None,
            normalized_input,
        }
    }
}

/// Comparison key: normalized, then kana-folded to hiragana so katakana and
/// hiragana renderings of the same word compare equal.
fn comparison_key(text: &str) -> String {
    to_hiragana(&normalize(text))
}

/// Judges `raw_input` against a question's canonical answers and accepted
/// variations.
///
/// Two passes, both in canonical-list order: first exact matches against
/// the canonical answers, then the variation lists (each in configured
/// order). The exact pass always wins — a variation string colliding with a
/// different canonical answer can never steal the credit. First hit wins
/// within each pass.
///
/// Empty input and an empty canonical list are both simply incorrect; this
/// function never fails.
#[must_use]
pub fn match_answer(
    raw_input: &str,
    correct_answers: &[String],
    acceptable_variations: &HashMap<String, Vec<String>>,
) -> MatchOutcome {
    if raw_input.trim().is_empty() {
        return MatchOutcome::incorrect(String::new());
    }

    let normalized_input = normalize(raw_input);
    if correct_answers.is_empty() {
        return MatchOutcome::incorrect(normalized_input);
    }

    let input_key = comparison_key(raw_input);

    for answer in correct_answers {
        if comparison_key(answer) == input_key {
            return MatchOutcome {
                is_correct: true,
                matched_answer: Some(answer.clone()),
                normalized_input,
            };
        }
    }

    for answer in correct_answers {
        let Some(variations) = acceptable_variations.get(answer) else {
            continue;
        };
        for variation in variations {
            if comparison_key(variation) == input_key {
                return MatchOutcome {
                    is_correct: true,
                    matched_answer: Some(answer.clone()),
                    normalized_input,
                };
            }
        }
    }

    MatchOutcome::incorrect(normalized_input)
}
