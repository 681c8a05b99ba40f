//! Storage port traits.
//!
//! Persistence is an opaque collaborator behind these traits: a PostgreSQL
//! implementation lives in `fivebomber-store`, in-memory fakes in
//! `fivebomber-test-support`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GameError;
use crate::model::{Connection, GameSession, Question};

/// Repository for game session state.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persists a freshly started session.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn insert(&self, session: &GameSession) -> Result<(), GameError>;

    /// Loads a session by ID, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure and
    /// `GameError::Parse` if the stored answer log cannot be decoded.
    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<GameSession>, GameError>;

    /// Writes back a mutated session under an optimistic-concurrency guard.
    ///
    /// `expected_version` is the version the caller read before mutating;
    /// the stored row's version must still match for the write to land, and
    /// the write bumps it to `session.version`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::TurnConflict` when another writer advanced the
    /// session first, `GameError::SessionNotFound` if the row vanished, and
    /// `GameError::Database` on storage failure.
    async fn update(&self, session: &GameSession, expected_version: i64)
    -> Result<(), GameError>;
}

/// Repository for live connection leases, indexed by room.
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Upserts a connection record by its connection ID. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn put(&self, connection: &Connection) -> Result<(), GameError>;

    /// Loads a connection by ID, `None` if absent.
    ///
    /// May return a logically-expired record; reaping is eventual and
    /// callers must tolerate the window.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn find_by_id(&self, connection_id: &str) -> Result<Option<Connection>, GameError>;

    /// Removes a connection record. Idempotent; absent is not an error.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn remove(&self, connection_id: &str) -> Result<(), GameError>;

    /// All connections currently recorded for a room, unordered.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Connection>, GameError>;

    /// Deletes every lease that expired at or before `now`; returns the
    /// number of rows reaped.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Database` on storage failure.
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, GameError>;
}

/// Read-only lookup of question reference data.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Fetches a question document by ID.
    ///
    /// # Errors
    ///
    /// Returns `GameError::QuestionNotFound` if no document exists,
    /// `GameError::Parse` if the document is malformed, and
    /// `GameError::Connection` on storage I/O failure.
    async fn get_question_by_id(&self, question_id: &str) -> Result<Question, GameError>;
}
