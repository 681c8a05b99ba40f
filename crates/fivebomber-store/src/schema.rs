//! Database schema.

use sqlx::PgPool;

use fivebomber_core::error::GameError;

/// SQL to create the game sessions table.
pub const CREATE_GAME_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS game_sessions (
    session_id   UUID PRIMARY KEY,
    room_id      TEXT NOT NULL,
    question_id  TEXT NOT NULL,
    started_at   TIMESTAMPTZ NOT NULL,
    current_turn INTEGER NOT NULL DEFAULT 0,
    answers      JSONB NOT NULL DEFAULT '[]'::jsonb,
    status       VARCHAR(16) NOT NULL,
    version      BIGINT NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_game_sessions_room_id
    ON game_sessions (room_id);
";

/// SQL to create the connections table. The room index backs
/// `list_by_room`; the expiry index backs the reaper sweep.
pub const CREATE_CONNECTIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS connections (
    connection_id TEXT PRIMARY KEY,
    player_id     TEXT NOT NULL,
    room_id       TEXT NOT NULL,
    connected_at  TIMESTAMPTZ NOT NULL,
    expires_at    TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_connections_room_id
    ON connections (room_id);

CREATE INDEX IF NOT EXISTS idx_connections_expires_at
    ON connections (expires_at);
";

/// Creates all tables and indexes if they do not yet exist.
///
/// # Errors
///
/// Returns `GameError::Database` if any DDL statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), GameError> {
    for ddl in [CREATE_GAME_SESSIONS_TABLE, CREATE_CONNECTIONS_TABLE] {
        sqlx::raw_sql(ddl)
            .execute(pool)
            .await
            .map_err(|e| GameError::Database(format!("schema bootstrap failed: {e}")))?;
    }
    Ok(())
}
