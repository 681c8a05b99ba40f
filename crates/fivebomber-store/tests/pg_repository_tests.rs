//! Integration tests for the PostgreSQL repositories.
//!
//! These need a live database; run them with `DATABASE_URL` pointing at a
//! scratch PostgreSQL instance:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/fivebomber_test cargo test -p fivebomber-store -- --ignored
//! ```

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fivebomber_core::error::GameError;
use fivebomber_core::model::{AnswerRecord, Connection, GameSession, SessionStatus};
use fivebomber_core::repository::{ConnectionRepository, SessionRepository};
use fivebomber_store::schema::ensure_schema;
use fivebomber_store::{PgConnectionRepository, PgSessionRepository};

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = PgPool::connect(&url).await.expect("database connection");
    ensure_schema(&pool).await.expect("schema bootstrap");
    pool
}

fn make_session() -> GameSession {
    GameSession::new(Uuid::new_v4(), "room-1", "q1", Utc::now())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_session_insert_and_find_round_trip() {
    let repo = PgSessionRepository::new(test_pool().await);
    let session = make_session();

    repo.insert(&session).await.unwrap();

    let loaded = repo.find_by_id(session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded.room_id, "room-1");
    assert_eq!(loaded.question_id, "q1");
    assert_eq!(loaded.current_turn, 0);
    assert_eq!(loaded.status, SessionStatus::Playing);
    assert_eq!(loaded.version, 0);
    assert!(loaded.answers.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_session_find_missing_returns_none() {
    let repo = PgSessionRepository::new(test_pool().await);

    let loaded = repo.find_by_id(Uuid::new_v4()).await.unwrap();

    assert!(loaded.is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_session_update_bumps_version_and_keeps_answer_log() {
    let repo = PgSessionRepository::new(test_pool().await);
    let mut session = make_session();
    repo.insert(&session).await.unwrap();

    session.answers.push(AnswerRecord {
        player_id: "p1".into(),
        answer: "東京".into(),
        is_correct: true,
        timestamp: Utc::now(),
    });
    session.current_turn += 1;
    let expected = session.version;
    session.version += 1;
    repo.update(&session, expected).await.unwrap();

    let loaded = repo.find_by_id(session.session_id).await.unwrap().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.current_turn, 1);
    assert_eq!(loaded.answers.len(), 1);
    assert_eq!(loaded.answers[0].answer, "東京");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_session_update_with_stale_version_is_turn_conflict() {
    let repo = PgSessionRepository::new(test_pool().await);
    let mut session = make_session();
    repo.insert(&session).await.unwrap();

    // Land one write.
    let expected = session.version;
    session.version += 1;
    repo.update(&session, expected).await.unwrap();

    // Replay the same expectation.
    let result = repo.update(&session, expected).await;

    match result.unwrap_err() {
        GameError::TurnConflict {
            expected: e,
            actual,
            ..
        } => {
            assert_eq!(e, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected TurnConflict, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_session_update_on_missing_row_is_not_found() {
    let repo = PgSessionRepository::new(test_pool().await);
    let session = make_session();

    let result = repo.update(&session, 0).await;

    match result.unwrap_err() {
        GameError::SessionNotFound(id) => assert_eq!(id, session.session_id),
        other => panic!("expected SessionNotFound, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_connection_put_is_idempotent_upsert() {
    let repo = PgConnectionRepository::new(test_pool().await);
    let id = format!("conn-{}", Uuid::new_v4());
    let mut connection = Connection::new(id.clone(), "p1", "room-upsert", Utc::now());

    repo.put(&connection).await.unwrap();
    connection.expires_at += Duration::seconds(60);
    repo.put(&connection).await.unwrap();

    let loaded = repo.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded.expires_at, connection.expires_at);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_connection_remove_is_idempotent() {
    let repo = PgConnectionRepository::new(test_pool().await);
    let id = format!("conn-{}", Uuid::new_v4());
    repo.put(&Connection::new(id.clone(), "p1", "room-rm", Utc::now()))
        .await
        .unwrap();

    repo.remove(&id).await.unwrap();
    // Absent is not an error.
    repo.remove(&id).await.unwrap();

    assert!(repo.find_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_list_by_room_only_returns_that_room() {
    let repo = PgConnectionRepository::new(test_pool().await);
    let room = format!("room-{}", Uuid::new_v4());
    let other = format!("room-{}", Uuid::new_v4());
    repo.put(&Connection::new("conn-a", "p1", room.clone(), Utc::now()))
        .await
        .unwrap();
    repo.put(&Connection::new("conn-b", "p2", room.clone(), Utc::now()))
        .await
        .unwrap();
    repo.put(&Connection::new("conn-c", "p3", other, Utc::now()))
        .await
        .unwrap();

    let listed = repo.list_by_room(&room).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.room_id == room));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_remove_expired_sweeps_only_lapsed_leases() {
    let repo = PgConnectionRepository::new(test_pool().await);
    let now = Utc::now();
    let room = format!("room-{}", Uuid::new_v4());
    let fresh_id = format!("conn-{}", Uuid::new_v4());
    let stale_id = format!("conn-{}", Uuid::new_v4());
    repo.put(&Connection::new(fresh_id.clone(), "p1", room.clone(), now))
        .await
        .unwrap();
    let mut stale = Connection::new(stale_id.clone(), "p2", room, now);
    stale.expires_at = now - Duration::seconds(5);
    repo.put(&stale).await.unwrap();

    let reaped = repo.remove_expired(now).await.unwrap();

    assert!(reaped >= 1);
    assert!(repo.find_by_id(&stale_id).await.unwrap().is_none());
    assert!(repo.find_by_id(&fresh_id).await.unwrap().is_some());
}
