//! Round lifecycle routes.
//!
//! Rounds are started by the room flow over REST; gameplay itself runs
//! over the WebSocket. Starting a round also arms the fire-once 30-second
//! timeout task — the external clock signal the engine itself never waits
//! on.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use fivebomber_core::error::GameError;
use fivebomber_core::model::{GameSession, QuestionView, SessionStatus};
use fivebomber_game::engine;
use fivebomber_game::rules::TIME_LIMIT_SECONDS;
use fivebomber_game::score;

use crate::error::ApiError;
use crate::protocol::OutboundMessage;
use crate::state::AppState;

/// Request body for POST /api/v1/games.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    /// The room starting a round.
    pub room_id: String,
    /// The question to play.
    pub question_id: String,
}

/// Response body for a started round.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    /// The persisted session.
    pub session: GameSession,
    /// The player-safe question projection.
    pub question: QuestionView,
}

/// POST /api/v1/games
#[instrument(skip(state, request), fields(room_id = %request.room_id, question_id = %request.question_id))]
async fn start_game(
    State(state): State<AppState>,
    Json(request): Json<StartGameRequest>,
) -> Result<(StatusCode, Json<StartGameResponse>), ApiError> {
    if request.room_id.trim().is_empty() || request.question_id.trim().is_empty() {
        return Err(ApiError(GameError::Validation(
            "roomId and questionId must be non-empty".to_owned(),
        )));
    }

    let started = engine::start_game(
        &request.room_id,
        &request.question_id,
        state.clock.as_ref(),
        state.sessions.as_ref(),
        state.questions.as_ref(),
    )
    .await?;

    let announcement = OutboundMessage::QuestionStart(started.question.clone());
    if let Err(err) = state
        .broadcaster
        .broadcast_to_room(&request.room_id, &announcement.to_value())
        .await
    {
        error!(room_id = %request.room_id, %err, "questionStart broadcast failed");
    }

    spawn_round_timeout(state, started.session.session_id, request.room_id.clone());

    Ok((
        StatusCode::CREATED,
        Json(StartGameResponse {
            session: started.session,
            question: started.question,
        }),
    ))
}

/// Arms the fire-once round timeout: after the time limit, flip a still-
/// playing session to `Timeout` and announce the unsuccessful finish. A
/// round that completed first is left alone.
fn spawn_round_timeout(state: AppState, session_id: Uuid, room_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(
            u64::try_from(TIME_LIMIT_SECONDS).unwrap_or(30),
        ))
        .await;

        let session = match engine::force_timeout(session_id, state.sessions.as_ref()).await {
            Ok(session) => session,
            Err(err) => {
                error!(%session_id, %err, "round timeout failed");
                return;
            }
        };
        if session.status != SessionStatus::Timeout {
            return;
        }

        info!(%session_id, room_id, "round timed out");
        let correct = u32::try_from(session.correct_count()).unwrap_or(0);
        let game_over = OutboundMessage::GameOver {
            success: false,
            total_score: score::total_score(correct, 0),
            time_bonus: 0,
        };
        if let Err(err) = state
            .broadcaster
            .broadcast_to_room(&room_id, &game_over.to_value())
            .await
        {
            error!(room_id, %err, "gameOver broadcast failed");
        }
    });
}

/// Returns the round lifecycle router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(start_game))
}
