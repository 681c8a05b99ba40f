//! Inbound message dispatch.
//!
//! One entry point per text frame: parse, dispatch to the engine,
//! translate the result to an outbound envelope, and trigger room
//! broadcasts for state-changing events. Every failure — typed or
//! unexpected — comes back as a structured error envelope; nothing
//! escapes to the transport as a panic or raw error.

use tracing::{error, instrument};

use fivebomber_core::model::{Connection, RankingEntry};
use fivebomber_game::engine::{self, SubmitOutcome};
use fivebomber_game::score;

use crate::protocol::{
    InboundMessage, OutboundMessage, SubmitAnswerPayload, SyncGameStatePayload, parse_inbound,
};
use crate::state::AppState;

/// Handles one inbound text frame from `connection` and returns the direct
/// reply for the sender. Room-wide effects are broadcast from here; their
/// delivery failures are logged, not surfaced to the submitter, and carry
/// no ordering guarantee relative to the direct reply.
#[instrument(skip(state, connection, text), fields(connection_id = %connection.connection_id))]
pub async fn handle_text(state: &AppState, connection: &Connection, text: &str) -> OutboundMessage {
    match parse_inbound(text) {
        Ok(InboundMessage::SubmitAnswer(payload)) => handle_submit_answer(state, payload).await,
        Ok(InboundMessage::SyncGameState(payload)) => handle_sync_game_state(state, payload).await,
        Ok(InboundMessage::Unknown(kind)) => {
            error!(kind, "unknown message type");
            OutboundMessage::unknown_type(&kind)
        }
        Err(err) => OutboundMessage::from_error(&err),
    }
}

async fn handle_submit_answer(state: &AppState, payload: SubmitAnswerPayload) -> OutboundMessage {
    let outcome = match engine::submit_answer(
        payload.session_id,
        &payload.player_id,
        &payload.answer,
        state.clock.as_ref(),
        state.sessions.as_ref(),
        state.questions.as_ref(),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => return OutboundMessage::from_error(&err),
    };

    let reply = OutboundMessage::AnswerResult {
        correct: outcome.result.correct,
        score: outcome.result.correct.then_some(outcome.result.score),
        next_turn: outcome.result.next_turn,
    };

    if outcome.result.correct {
        broadcast(state, &outcome.session.room_id, &reply).await;
    }
    if outcome.result.game_completed {
        announce_completion(state, &outcome).await;
    }

    reply
}

async fn handle_sync_game_state(
    state: &AppState,
    payload: SyncGameStatePayload,
) -> OutboundMessage {
    match engine::sync_game_state(
        payload.session_id,
        state.sessions.as_ref(),
        state.questions.as_ref(),
    )
    .await
    {
        Ok(view) => OutboundMessage::QuestionStart(view.question),
        Err(err) => OutboundMessage::from_error(&err),
    }
}

/// Broadcasts the end-of-round envelopes: the final score and the room's
/// ranking entry. Cross-room standings belong to the room service; this
/// engine contributes the finishing room's own row.
async fn announce_completion(state: &AppState, outcome: &SubmitOutcome) {
    let session = &outcome.session;
    let remaining = engine::remaining_seconds(session.started_at, state.clock.now());
    let correct = u32::try_from(session.correct_count()).unwrap_or(0);
    let total_score = score::total_score(correct, remaining);

    let game_over = OutboundMessage::GameOver {
        success: true,
        total_score,
        time_bonus: score::time_bonus(remaining),
    };
    broadcast(state, &session.room_id, &game_over).await;

    let ranking = OutboundMessage::RankingUpdate {
        rankings: vec![RankingEntry {
            room_id: session.room_id.clone(),
            team_name: session.room_id.clone(),
            score: total_score,
            rank: 1,
        }],
    };
    broadcast(state, &session.room_id, &ranking).await;
}

async fn broadcast(state: &AppState, room_id: &str, message: &OutboundMessage) {
    if let Err(err) = state
        .broadcaster
        .broadcast_to_room(room_id, &message.to_value())
        .await
    {
        error!(room_id, %err, "room broadcast failed");
    }
}
