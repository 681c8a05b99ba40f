//! Session engine operations.
//!
//! Free functions in the load → mutate → persist-with-expected-version
//! shape: each operation reads its session, applies the game rules, and
//! writes back under the optimistic-concurrency guard. There are no
//! internal retries; a lost race surfaces as `GameError::TurnConflict`.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use fivebomber_core::clock::Clock;
use fivebomber_core::error::GameError;
use fivebomber_core::model::{AnswerRecord, GameSession, QuestionView, SessionStatus};
use fivebomber_core::repository::{QuestionRepository, SessionRepository};
use fivebomber_matching::match_answer;

use crate::rules::{REQUIRED_ANSWERS, TIME_LIMIT_SECONDS};
use crate::score;

/// A freshly started round plus the player-safe question projection.
#[derive(Debug)]
pub struct StartedGame {
    /// The persisted session.
    pub session: GameSession,
    /// Prompt, category, and difficulty only — canonical answers and
    /// variations never leave the engine while a round is live.
    pub question: QuestionView,
}

/// The answer judgment returned to the submitting player.
#[derive(Debug, Clone, Copy)]
pub struct AnswerResult {
    /// Whether the answer was accepted.
    pub correct: bool,
    /// Points awarded for this answer (zero when incorrect).
    pub score: u32,
    /// The turn slot due to answer next.
    pub next_turn: u32,
    /// Whether this answer completed the round.
    pub game_completed: bool,
}

/// Result of a processed submission: the judgment plus the session as
/// persisted, for downstream broadcasts.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// The judgment for the submitting player.
    pub result: AnswerResult,
    /// The session state after the write.
    pub session: GameSession,
}

/// Read-only snapshot for state resynchronization.
#[derive(Debug)]
pub struct GameStateView {
    /// The current session state.
    pub session: GameSession,
    /// The player-safe question projection.
    pub question: QuestionView,
}

/// Starts a new round for `room_id` on `question_id`.
///
/// # Errors
///
/// Returns `GameError::QuestionNotFound` if the question does not exist and
/// `GameError::Database` if persisting the session fails.
pub async fn start_game(
    room_id: &str,
    question_id: &str,
    clock: &dyn Clock,
    sessions: &dyn SessionRepository,
    questions: &dyn QuestionRepository,
) -> Result<StartedGame, GameError> {
    let question = questions.get_question_by_id(question_id).await?;

    let session_id = Uuid::new_v4();
    let session = GameSession::new(session_id, room_id, question_id, clock.now());
    sessions.insert(&session).await?;

    info!(%session_id, room_id, question_id, "game started");

    Ok(StartedGame {
        question: QuestionView::from(&question),
        session,
    })
}

/// Judges one submitted answer and advances the round.
///
/// The attempt is appended to the session log whether or not it is correct.
/// A correct answer advances `current_turn` by one and awards the fixed
/// per-answer score; the fifth cumulative correct answer completes the
/// round. An incorrect answer leaves the turn slot unchanged so the same
/// player retries.
///
/// # Errors
///
/// Returns `GameError::SessionNotFound` / `GameError::QuestionNotFound`
/// verbatim, `GameError::TurnConflict` when a concurrent submission won the
/// write race, and `GameError::Database` on storage failure.
pub async fn submit_answer(
    session_id: Uuid,
    player_id: &str,
    raw_answer: &str,
    clock: &dyn Clock,
    sessions: &dyn SessionRepository,
    questions: &dyn QuestionRepository,
) -> Result<SubmitOutcome, GameError> {
    let mut session = sessions
        .find_by_id(session_id)
        .await?
        .ok_or(GameError::SessionNotFound(session_id))?;

    let question = questions.get_question_by_id(&session.question_id).await?;

    let outcome = match_answer(raw_answer, &question.answers, &question.acceptable_variations);
    debug!(
        %session_id,
        player_id,
        correct = outcome.is_correct,
        matched = outcome.matched_answer.as_deref(),
        "answer judged"
    );

    session.answers.push(AnswerRecord {
        player_id: player_id.to_owned(),
        answer: raw_answer.to_owned(),
        is_correct: outcome.is_correct,
        timestamp: clock.now(),
    });

    let mut awarded = 0;
    let mut game_completed = false;
    if outcome.is_correct {
        awarded = score::answer_score();
        session.current_turn += 1;
        if session.correct_count() >= REQUIRED_ANSWERS {
            session.status = SessionStatus::Completed;
            game_completed = true;
        }
    }

    let expected_version = session.version;
    session.version += 1;
    sessions.update(&session, expected_version).await?;

    if game_completed {
        info!(%session_id, room_id = session.room_id, "game completed");
    }

    Ok(SubmitOutcome {
        result: AnswerResult {
            correct: outcome.is_correct,
            score: awarded,
            next_turn: session.current_turn,
            game_completed,
        },
        session,
    })
}

/// Loads the current session state plus its question projection.
///
/// # Errors
///
/// Returns `GameError::SessionNotFound` / `GameError::QuestionNotFound`
/// verbatim and `GameError::Database` on storage failure.
pub async fn sync_game_state(
    session_id: Uuid,
    sessions: &dyn SessionRepository,
    questions: &dyn QuestionRepository,
) -> Result<GameStateView, GameError> {
    let session = sessions
        .find_by_id(session_id)
        .await?
        .ok_or(GameError::SessionNotFound(session_id))?;

    let question = questions.get_question_by_id(&session.question_id).await?;

    Ok(GameStateView {
        question: QuestionView::from(&question),
        session,
    })
}

/// Applies the external 30-second clock signal: flips a playing session to
/// `Timeout`. Fire-once — a session already completed (or already timed
/// out) is returned unchanged, so a round can never be both.
///
/// # Errors
///
/// Returns `GameError::SessionNotFound` verbatim, `GameError::TurnConflict`
/// if a submission raced the flip, and `GameError::Database` on storage
/// failure.
pub async fn force_timeout(
    session_id: Uuid,
    sessions: &dyn SessionRepository,
) -> Result<GameSession, GameError> {
    let mut session = sessions
        .find_by_id(session_id)
        .await?
        .ok_or(GameError::SessionNotFound(session_id))?;

    if session.status != SessionStatus::Playing {
        return Ok(session);
    }

    session.status = SessionStatus::Timeout;
    let expected_version = session.version;
    session.version += 1;
    sessions.update(&session, expected_version).await?;

    info!(%session_id, room_id = session.room_id, "game timed out");
    Ok(session)
}

/// Seconds left on the round clock at `now`, negative once lapsed.
#[must_use]
pub fn remaining_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    TIME_LIMIT_SECONDS - (now - started_at).num_seconds()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use fivebomber_core::error::GameError;
    use fivebomber_core::model::{GameSession, SessionStatus};
    use fivebomber_core::repository::SessionRepository;
    use fivebomber_test_support::{
        FailingSessionRepository, FixedClock, InMemorySessionRepository, StaticQuestionRepository,
        prefecture_question,
    };

    use super::*;

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_start_game_creates_playing_session_at_turn_zero() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));

        // Act
        let started = start_game("room-1", "q1", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert
        assert_eq!(started.session.status, SessionStatus::Playing);
        assert_eq!(started.session.current_turn, 0);
        assert!(started.session.answers.is_empty());
        assert_eq!(started.session.started_at, clock.0);
        assert_eq!(started.question.question_id, "q1");

        let stored = sessions.stored(started.session.session_id).unwrap();
        assert_eq!(stored.room_id, "room-1");
    }

    #[tokio::test]
    async fn test_start_game_projection_carries_no_answers() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));

        // Act
        let started = start_game("room-1", "q1", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert — serialize the projection and check the key set.
        let json = serde_json::to_value(&started.question).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert!(!keys.contains(&"answers"));
        assert!(!keys.contains(&"acceptableVariations"));
        assert!(keys.contains(&"questionText"));
    }

    #[tokio::test]
    async fn test_start_game_unknown_question_is_not_found() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::new();

        // Act
        let result = start_game("room-1", "missing", &clock, &sessions, &questions).await;

        // Assert
        match result.unwrap_err() {
            GameError::QuestionNotFound(id) => assert_eq!(id, "missing"),
            other => panic!("expected QuestionNotFound, got {other:?}"),
        }
    }

    async fn playing_session(sessions: &InMemorySessionRepository) -> Uuid {
        let session = GameSession::new(Uuid::new_v4(), "room-1", "q1", fixed_clock().0);
        let session_id = session.session_id;
        sessions.insert(&session).await.unwrap();
        session_id
    }

    #[tokio::test]
    async fn test_correct_answer_advances_turn_and_scores() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let session_id = playing_session(&sessions).await;

        // Act
        let outcome = submit_answer(session_id, "p1", "東京", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert
        assert!(outcome.result.correct);
        assert_eq!(outcome.result.score, 10);
        assert_eq!(outcome.result.next_turn, 1);
        assert!(!outcome.result.game_completed);

        let stored = sessions.stored(session_id).unwrap();
        assert_eq!(stored.current_turn, 1);
        assert_eq!(stored.answers.len(), 1);
        assert!(stored.answers[0].is_correct);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_incorrect_answer_keeps_turn_but_is_logged() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let session_id = playing_session(&sessions).await;

        // Act
        let outcome = submit_answer(session_id, "p1", "名古屋", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert
        assert!(!outcome.result.correct);
        assert_eq!(outcome.result.score, 0);
        assert_eq!(outcome.result.next_turn, 0);

        let stored = sessions.stored(session_id).unwrap();
        assert_eq!(stored.current_turn, 0);
        assert_eq!(stored.answers.len(), 1);
        assert!(!stored.answers[0].is_correct);
        assert_eq!(stored.status, SessionStatus::Playing);
    }

    #[tokio::test]
    async fn test_fifth_correct_answer_completes_the_game() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let session_id = playing_session(&sessions).await;

        // Act — four correct answers, one wrong retry, then the fifth.
        for answer in ["東京", "京都", "大阪", "北海道"] {
            let outcome = submit_answer(session_id, "p1", answer, &clock, &sessions, &questions)
                .await
                .unwrap();
            assert!(!outcome.result.game_completed);
        }
        let wrong = submit_answer(session_id, "p5", "名古屋", &clock, &sessions, &questions)
            .await
            .unwrap();
        let fifth = submit_answer(session_id, "p5", "沖縄", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert
        assert!(!wrong.result.correct);
        assert!(fifth.result.correct);
        assert!(fifth.result.game_completed);
        assert_eq!(fifth.result.next_turn, 5);

        let stored = sessions.stored(session_id).unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        assert_eq!(stored.correct_count(), 5);
        assert_eq!(stored.answers.len(), 6);
    }

    #[tokio::test]
    async fn test_submit_answer_unknown_session_is_not_found() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let missing = Uuid::new_v4();

        // Act
        let result = submit_answer(missing, "p1", "東京", &clock, &sessions, &questions).await;

        // Assert
        match result.unwrap_err() {
            GameError::SessionNotFound(id) => assert_eq!(id, missing),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_answer_persists_with_pre_increment_version() {
        // Arrange — seed a session whose version is already 3.
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let mut session = GameSession::new(Uuid::new_v4(), "room-1", "q1", clock.0);
        session.version = 3;
        let session_id = session.session_id;
        sessions.insert(&session).await.unwrap();

        // Act
        let outcome = submit_answer(session_id, "p1", "東京", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Assert — the CAS expected 3 and the write bumped to 4.
        assert_eq!(outcome.session.version, 4);
        assert_eq!(sessions.stored(session_id).unwrap().version, 4);
    }

    #[tokio::test]
    async fn test_concurrent_submission_loses_with_turn_conflict() {
        // Arrange — two writers read the same session state; the first
        // write lands, the second must not clobber it.
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let session_id = playing_session(&sessions).await;
        let stale = sessions.stored(session_id).unwrap();

        // First writer wins the race.
        submit_answer(session_id, "p1", "東京", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Act — second writer writes back from its stale read.
        let mut second = stale.clone();
        second.current_turn += 1;
        second.version += 1;
        let result = sessions.update(&second, stale.version).await;

        // Assert
        match result.unwrap_err() {
            GameError::TurnConflict {
                session_id: conflicted,
                expected,
                actual,
            } => {
                assert_eq!(conflicted, session_id);
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected TurnConflict, got {other:?}"),
        }

        // The winning writer's appended entry survived.
        let stored = sessions.stored(session_id).unwrap();
        assert_eq!(stored.answers.len(), 1);
        assert_eq!(stored.answers[0].player_id, "p1");
    }

    #[tokio::test]
    async fn test_submit_answer_wraps_storage_failure() {
        // Arrange
        let clock = fixed_clock();
        let sessions = FailingSessionRepository;
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));

        // Act
        let result =
            submit_answer(Uuid::new_v4(), "p1", "東京", &clock, &sessions, &questions).await;

        // Assert
        match result.unwrap_err() {
            GameError::Database(_) => {}
            other => panic!("expected Database, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sync_game_state_returns_session_and_projection() {
        // Arrange
        let clock = fixed_clock();
        let sessions = InMemorySessionRepository::new();
        let questions = StaticQuestionRepository::with_question(prefecture_question("q1"));
        let session_id = playing_session(&sessions).await;
        submit_answer(session_id, "p1", "東京", &clock, &sessions, &questions)
            .await
            .unwrap();

        // Act
        let view = sync_game_state(session_id, &sessions, &questions)
            .await
            .unwrap();

        // Assert
        assert_eq!(view.session.session_id, session_id);
        assert_eq!(view.session.current_turn, 1);
        assert_eq!(view.question.question_id, "q1");
    }

    #[tokio::test]
    async fn test_force_timeout_flips_playing_session() {
        // Arrange
        let sessions = InMemorySessionRepository::new();
        let session_id = playing_session(&sessions).await;

        // Act
        let session = force_timeout(session_id, &sessions).await.unwrap();

        // Assert
        assert_eq!(session.status, SessionStatus::Timeout);
        assert_eq!(sessions.stored(session_id).unwrap().status, SessionStatus::Timeout);
    }

    #[tokio::test]
    async fn test_force_timeout_leaves_completed_session_untouched() {
        // Arrange
        let mut session = GameSession::new(Uuid::new_v4(), "room-1", "q1", fixed_clock().0);
        session.status = SessionStatus::Completed;
        let session_id = session.session_id;
        let sessions = InMemorySessionRepository::with_session(session);

        // Act
        let result = force_timeout(session_id, &sessions).await.unwrap();

        // Assert
        assert_eq!(result.status, SessionStatus::Completed);
        assert_eq!(
            sessions.stored(session_id).unwrap().status,
            SessionStatus::Completed
        );
    }

    #[test]
    fn test_remaining_seconds_counts_down_from_the_limit() {
        let started = fixed_clock().0;
        assert_eq!(remaining_seconds(started, started), 30);
        assert_eq!(remaining_seconds(started, started + Duration::seconds(18)), 12);
        assert_eq!(remaining_seconds(started, started + Duration::seconds(45)), -15);
    }
}
