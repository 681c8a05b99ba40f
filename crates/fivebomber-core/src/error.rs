//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the realtime game engine.
///
/// "Recipient gone" is deliberately absent: a vanished delivery target is an
/// expected outcome of fan-out, modeled as
/// [`crate::transport::SendOutcome::RecipientGone`].
#[derive(Debug, Error)]
pub enum GameError {
    /// No game session exists for the given ID.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// No question document exists for the given ID.
    #[error("question not found: {0}")]
    QuestionNotFound(String),

    /// Optimistic concurrency conflict on a session write.
    #[error("turn conflict on session {session_id}: expected version {expected}, found {actual}")]
    TurnConflict {
        /// The session that had the conflict.
        session_id: Uuid,
        /// The version the writer expected.
        expected: i64,
        /// The version actually found.
        actual: i64,
    },

    /// Semantically invalid input (structurally parseable, but incomplete
    /// or out of range).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed JSON, inbound or stored.
    #[error("parse error: {0}")]
    Parse(String),

    /// Database read or write failure.
    #[error("database error: {0}")]
    Database(String),

    /// Connection-level storage or transport I/O failure.
    #[error("connection error: {0}")]
    Connection(String),
}

impl GameError {
    /// Stable machine-readable code for the outbound error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::QuestionNotFound(_) => "question_not_found",
            Self::TurnConflict { .. } => "turn_conflict",
            Self::Validation(_) => "validation_error",
            Self::Parse(_) => "parse_error",
            Self::Database(_) => "database_error",
            Self::Connection(_) => "connection_error",
        }
    }
}
