//! Test repositories — in-memory and failing implementations of the
//! storage ports.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fivebomber_core::error::GameError;
use fivebomber_core::model::{Connection, GameSession, Question};
use fivebomber_core::repository::{ConnectionRepository, QuestionRepository, SessionRepository};

/// An in-memory session store with real compare-and-set semantics, so
/// optimistic-concurrency paths behave exactly as the Postgres store does.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<Uuid, GameSession>>,
}

impl InMemorySessionRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with one session.
    #[must_use]
    pub fn with_session(session: GameSession) -> Self {
        let repo = Self::default();
        repo.sessions
            .lock()
            .unwrap()
            .insert(session.session_id, session);
        repo
    }

    /// Snapshot of a stored session, for assertions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored(&self, session_id: Uuid) -> Option<GameSession> {
        self.sessions.lock().unwrap().get(&session_id).cloned()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &GameSession) -> Result<(), GameError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<GameSession>, GameError> {
        Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
    }

    async fn update(
        &self,
        session: &GameSession,
        expected_version: i64,
    ) -> Result<(), GameError> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(stored) = sessions.get(&session.session_id) else {
            return Err(GameError::SessionNotFound(session.session_id));
        };
        if stored.version != expected_version {
            return Err(GameError::TurnConflict {
                session_id: session.session_id,
                expected: expected_version,
                actual: stored.version,
            });
        }
        sessions.insert(session.session_id, session.clone());
        Ok(())
    }
}

/// A session store that always fails with a database error.
#[derive(Debug, Default)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn insert(&self, _session: &GameSession) -> Result<(), GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn find_by_id(&self, _session_id: Uuid) -> Result<Option<GameSession>, GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn update(
        &self,
        _session: &GameSession,
        _expected_version: i64,
    ) -> Result<(), GameError> {
        Err(GameError::Database("connection refused".into()))
    }
}

/// An in-memory connection store that records every `remove` call, so
/// fan-out cleanup can be asserted on.
#[derive(Debug, Default)]
pub struct InMemoryConnectionRepository {
    connections: Mutex<HashMap<String, Connection>>,
    removed: Mutex<Vec<String>>,
}

impl InMemoryConnectionRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given connections.
    #[must_use]
    pub fn with_connections(connections: Vec<Connection>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.connections.lock().unwrap();
            for connection in connections {
                map.insert(connection.connection_id.clone(), connection);
            }
        }
        repo
    }

    /// Every connection ID passed to `remove`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn removed_ids(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    /// Snapshot of every stored connection, across all rooms.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn all(&self) -> Vec<Connection> {
        self.connections.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn put(&self, connection: &Connection) -> Result<(), GameError> {
        self.connections
            .lock()
            .unwrap()
            .insert(connection.connection_id.clone(), connection.clone());
        Ok(())
    }

    async fn find_by_id(&self, connection_id: &str) -> Result<Option<Connection>, GameError> {
        Ok(self.connections.lock().unwrap().get(connection_id).cloned())
    }

    async fn remove(&self, connection_id: &str) -> Result<(), GameError> {
        self.connections.lock().unwrap().remove(connection_id);
        self.removed.lock().unwrap().push(connection_id.to_owned());
        Ok(())
    }

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Connection>, GameError> {
        Ok(self
            .connections
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, GameError> {
        let mut connections = self.connections.lock().unwrap();
        let expired: Vec<String> = connections
            .values()
            .filter(|c| c.is_expired(now))
            .map(|c| c.connection_id.clone())
            .collect();
        for id in &expired {
            connections.remove(id);
            self.removed.lock().unwrap().push(id.clone());
        }
        Ok(expired.len() as u64)
    }
}

/// A connection store that always fails with a database error.
#[derive(Debug, Default)]
pub struct FailingConnectionRepository;

#[async_trait]
impl ConnectionRepository for FailingConnectionRepository {
    async fn put(&self, _connection: &Connection) -> Result<(), GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn find_by_id(&self, _connection_id: &str) -> Result<Option<Connection>, GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn remove(&self, _connection_id: &str) -> Result<(), GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn list_by_room(&self, _room_id: &str) -> Result<Vec<Connection>, GameError> {
        Err(GameError::Database("connection refused".into()))
    }

    async fn remove_expired(&self, _now: DateTime<Utc>) -> Result<u64, GameError> {
        Err(GameError::Database("connection refused".into()))
    }
}

/// A question repository serving a fixed set of in-memory questions.
#[derive(Debug, Default)]
pub struct StaticQuestionRepository {
    questions: HashMap<String, Question>,
}

impl StaticQuestionRepository {
    /// Creates an empty repository; every lookup is a miss.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository serving exactly one question.
    #[must_use]
    pub fn with_question(question: Question) -> Self {
        let mut questions = HashMap::new();
        questions.insert(question.id.clone(), question);
        Self { questions }
    }
}

#[async_trait]
impl QuestionRepository for StaticQuestionRepository {
    async fn get_question_by_id(&self, question_id: &str) -> Result<Question, GameError> {
        self.questions
            .get(question_id)
            .cloned()
            .ok_or_else(|| GameError::QuestionNotFound(question_id.to_owned()))
    }
}
