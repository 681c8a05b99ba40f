//! Shared fixtures.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use fivebomber_core::model::{Connection, Difficulty, Question};

/// A five-answer prefecture question with kana variations, the canonical
/// fixture across engine, matcher, and router tests.
#[must_use]
pub fn prefecture_question(id: &str) -> Question {
    let mut acceptable_variations = HashMap::new();
    acceptable_variations.insert(
        "東京".to_owned(),
        vec!["とうきょう".to_owned(), "トウキョウ".to_owned(), "Tokyo".to_owned()],
    );
    acceptable_variations.insert(
        "京都".to_owned(),
        vec!["きょうと".to_owned(), "Kyoto".to_owned()],
    );
    acceptable_variations.insert(
        "大阪".to_owned(),
        vec!["おおさか".to_owned(), "Osaka".to_owned()],
    );

    Question {
        id: id.to_owned(),
        question: "日本の都道府県を5つ答えよ".to_owned(),
        answers: vec![
            "東京".to_owned(),
            "京都".to_owned(),
            "大阪".to_owned(),
            "北海道".to_owned(),
            "沖縄".to_owned(),
        ],
        acceptable_variations,
        category: "geography".to_owned(),
        difficulty: Difficulty::Easy,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

/// A connection record for `room_id` with its lease stamped from `now`.
#[must_use]
pub fn sample_connection(connection_id: &str, room_id: &str, now: DateTime<Utc>) -> Connection {
    Connection::new(connection_id, format!("player-{connection_id}"), room_id, now)
}
