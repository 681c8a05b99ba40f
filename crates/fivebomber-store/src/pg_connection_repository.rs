//! PostgreSQL implementation of `ConnectionRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;

use fivebomber_core::error::GameError;
use fivebomber_core::model::Connection;
use fivebomber_core::repository::ConnectionRepository;

/// PostgreSQL-backed connection lease store.
///
/// Reads do not filter on `expires_at` — reaping is the background sweep's
/// job, and callers tolerate the occasional logically-expired row.
#[derive(Debug, Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    /// Creates a new `PgConnectionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> GameError {
    GameError::Database(e.to_string())
}

fn row_to_connection(row: &PgRow) -> Result<Connection, GameError> {
    Ok(Connection {
        connection_id: row.try_get("connection_id").map_err(db_error)?,
        player_id: row.try_get("player_id").map_err(db_error)?,
        room_id: row.try_get("room_id").map_err(db_error)?,
        connected_at: row
            .try_get::<DateTime<Utc>, _>("connected_at")
            .map_err(db_error)?,
        expires_at: row
            .try_get::<DateTime<Utc>, _>("expires_at")
            .map_err(db_error)?,
    })
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    async fn put(&self, connection: &Connection) -> Result<(), GameError> {
        sqlx::query(
            "INSERT INTO connections (connection_id, player_id, room_id, connected_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (connection_id) DO UPDATE \
             SET player_id = $2, room_id = $3, connected_at = $4, expires_at = $5",
        )
        .bind(&connection.connection_id)
        .bind(&connection.player_id)
        .bind(&connection.room_id)
        .bind(connection.connected_at)
        .bind(connection.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_by_id(&self, connection_id: &str) -> Result<Option<Connection>, GameError> {
        let row = sqlx::query(
            "SELECT connection_id, player_id, room_id, connected_at, expires_at \
             FROM connections WHERE connection_id = $1",
        )
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(row_to_connection).transpose()
    }

    async fn remove(&self, connection_id: &str) -> Result<(), GameError> {
        sqlx::query("DELETE FROM connections WHERE connection_id = $1")
            .bind(connection_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Connection>, GameError> {
        let rows = sqlx::query(
            "SELECT connection_id, player_id, room_id, connected_at, expires_at \
             FROM connections WHERE room_id = $1",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_connection).collect()
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, GameError> {
        let result = sqlx::query("DELETE FROM connections WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected())
    }
}
