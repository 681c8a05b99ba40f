//! PostgreSQL implementation of `SessionRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use uuid::Uuid;

use fivebomber_core::error::GameError;
use fivebomber_core::model::{AnswerRecord, GameSession, SessionStatus};
use fivebomber_core::repository::SessionRepository;

/// PostgreSQL-backed session store. The answer log rides in a JSONB column;
/// the `version` column carries the optimistic-concurrency counter.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new `PgSessionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, session_id: Uuid) -> Result<Option<i64>, GameError> {
        let row = sqlx::query("SELECT version FROM game_sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(|r| r.try_get::<i64, _>("version").map_err(db_error))
            .transpose()
    }
}

fn db_error(e: sqlx::Error) -> GameError {
    GameError::Database(e.to_string())
}

fn row_to_session(row: &PgRow) -> Result<GameSession, GameError> {
    let answers_json: serde_json::Value = row.try_get("answers").map_err(db_error)?;
    let answers: Vec<AnswerRecord> = serde_json::from_value(answers_json)
        .map_err(|e| GameError::Parse(format!("stored answer log: {e}")))?;

    let status_raw: String = row.try_get("status").map_err(db_error)?;
    let status = SessionStatus::parse(&status_raw)
        .ok_or_else(|| GameError::Parse(format!("stored session status: {status_raw}")))?;

    let current_turn: i32 = row.try_get("current_turn").map_err(db_error)?;

    Ok(GameSession {
        session_id: row.try_get("session_id").map_err(db_error)?,
        room_id: row.try_get("room_id").map_err(db_error)?,
        question_id: row.try_get("question_id").map_err(db_error)?,
        started_at: row
            .try_get::<DateTime<Utc>, _>("started_at")
            .map_err(db_error)?,
        current_turn: u32::try_from(current_turn.max(0)).unwrap_or(0),
        answers,
        status,
        version: row.try_get("version").map_err(db_error)?,
    })
}

fn answers_json(session: &GameSession) -> serde_json::Value {
    // Serializing derived-Serialize records to a Value is infallible.
    serde_json::to_value(&session.answers).expect("answer log serialization is infallible")
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: &GameSession) -> Result<(), GameError> {
        sqlx::query(
            "INSERT INTO game_sessions \
             (session_id, room_id, question_id, started_at, current_turn, answers, status, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(session.session_id)
        .bind(&session.room_id)
        .bind(&session.question_id)
        .bind(session.started_at)
        .bind(i32::try_from(session.current_turn).unwrap_or(i32::MAX))
        .bind(answers_json(session))
        .bind(session.status.as_str())
        .bind(session.version)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<GameSession>, GameError> {
        let row = sqlx::query(
            "SELECT session_id, room_id, question_id, started_at, current_turn, answers, status, version \
             FROM game_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn update(
        &self,
        session: &GameSession,
        expected_version: i64,
    ) -> Result<(), GameError> {
        let result = sqlx::query(
            "UPDATE game_sessions \
             SET current_turn = $1, answers = $2, status = $3, version = $4 \
             WHERE session_id = $5 AND version = $6",
        )
        .bind(i32::try_from(session.current_turn).unwrap_or(i32::MAX))
        .bind(answers_json(session))
        .bind(session.status.as_str())
        .bind(session.version)
        .bind(session.session_id)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Zero rows: either the row is gone or another writer advanced it.
        match self.current_version(session.session_id).await? {
            None => Err(GameError::SessionNotFound(session.session_id)),
            Some(actual) => Err(GameError::TurnConflict {
                session_id: session.session_id,
                expected: expected_version,
                actual,
            }),
        }
    }
}
