//! Domain models shared across the engine.
//!
//! Wire-facing structs serialize with camelCase field names to match the
//! JSON protocol and the stored question documents.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a connection lease lives without being refreshed, in seconds.
pub const CONNECTION_TTL_SECONDS: i64 = 3600;

/// An ephemeral record of one live transport session.
///
/// Created at socket-open, removed on confirmed-gone delivery, socket close,
/// or TTL reaping. Removal is eventual, never guaranteed instantaneous, so
/// readers must tolerate logically-expired entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Opaque transport-session identifier, unique per live socket.
    pub connection_id: String,
    /// The player this socket belongs to.
    pub player_id: String,
    /// The room this socket is subscribed to.
    pub room_id: String,
    /// When the socket was opened.
    pub connected_at: DateTime<Utc>,
    /// Lease expiry; the reaper deletes rows past this instant.
    pub expires_at: DateTime<Utc>,
}

impl Connection {
    /// Creates a connection record with its lease stamped from `now`.
    #[must_use]
    pub fn new(
        connection_id: impl Into<String>,
        player_id: impl Into<String>,
        room_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            player_id: player_id.into(),
            room_id: room_id.into(),
            connected_at: now,
            expires_at: now + Duration::seconds(CONNECTION_TTL_SECONDS),
        }
    }

    /// Whether the lease has lapsed as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Lifecycle of a game session. Terminal once it leaves `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Round in progress; answers are being accepted.
    Playing,
    /// Five correct answers were reached.
    Completed,
    /// The 30-second clock ran out first.
    Timeout,
}

impl SessionStatus {
    /// Storage representation, matching the serde form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "playing" => Some(Self::Playing),
            "completed" => Some(Self::Completed),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

/// One submitted answer, appended to the session log regardless of
/// correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    /// The submitting player.
    pub player_id: String,
    /// The raw answer text as typed.
    pub answer: String,
    /// Whether it matched a canonical answer or accepted variation.
    pub is_correct: bool,
    /// When the answer was recorded.
    pub timestamp: DateTime<Utc>,
}

/// One round of the game, owned by a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Unique per round.
    pub session_id: Uuid,
    /// The room playing this round.
    pub room_id: String,
    /// The question being answered.
    pub question_id: String,
    /// Round start time; the timeout clock counts from here.
    pub started_at: DateTime<Utc>,
    /// Zero-based rotational index of the player slot due to answer next.
    /// Advances only on a correct answer.
    pub current_turn: u32,
    /// Append-only answer log.
    pub answers: Vec<AnswerRecord>,
    /// Round lifecycle state.
    pub status: SessionStatus,
    /// Optimistic-concurrency counter, incremented on every persisted write.
    #[serde(default)]
    pub version: i64,
}

impl GameSession {
    /// Creates a fresh round for `room_id` on `question_id`.
    #[must_use]
    pub fn new(
        session_id: Uuid,
        room_id: impl Into<String>,
        question_id: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            room_id: room_id.into(),
            question_id: question_id.into(),
            started_at,
            current_turn: 0,
            answers: Vec::new(),
            status: SessionStatus::Playing,
            version: 0,
        }
    }

    /// Number of correct entries in the answer log.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

/// Question difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Immutable question reference data, loaded from external object storage.
///
/// `answers` carries the canonical answer strings in priority order (at
/// least five for this mode); `acceptable_variations` maps each canonical
/// answer to its alternate spellings, in configured order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question identifier, also the storage key.
    pub id: String,
    /// The prompt text shown to players.
    pub question: String,
    /// Canonical answers, in match-priority order.
    pub answers: Vec<String>,
    /// Alternate spellings keyed by canonical answer.
    #[serde(default)]
    pub acceptable_variations: HashMap<String, Vec<String>>,
    /// Question category.
    pub category: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Authoring timestamp, epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Last-edit timestamp, epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

/// Player-safe projection of a [`Question`].
///
/// Canonical answers and variations must never reach a client while a round
/// is live, so this is the only question shape the protocol layer sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// Question identifier.
    pub question_id: String,
    /// The prompt text.
    pub question_text: String,
    /// Question category.
    pub category: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id.clone(),
            question_text: question.question.clone(),
            category: question.category.clone(),
            difficulty: question.difficulty,
        }
    }
}

/// One row of the team ranking board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// The room the team played in.
    pub room_id: String,
    /// Display name of the team.
    pub team_name: String,
    /// Final score.
    pub score: u32,
    /// 1-based rank.
    pub rank: u32,
}
