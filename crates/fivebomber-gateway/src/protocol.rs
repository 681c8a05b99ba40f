//! Wire protocol envelopes.
//!
//! Inbound parsing happens in two stages so the two failure classes stay
//! distinct: a malformed frame is a parse error, a well-formed envelope
//! whose payload is missing fields is a validation error. The message kinds
//! form a closed set — an unrecognized type lands in the explicit `Unknown`
//! arm and is answered with a structured error naming it, never silently
//! dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use fivebomber_core::error::GameError;
use fivebomber_core::model::{QuestionView, RankingEntry};

/// Raw inbound envelope, decoded before the payload is interpreted.
#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Payload of a `submitAnswer` message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerPayload {
    /// The round being answered.
    pub session_id: Uuid,
    /// The submitting player.
    pub player_id: String,
    /// The raw answer text.
    pub answer: String,
}

/// Payload of a `syncGameState` message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncGameStatePayload {
    /// The round to resynchronize.
    pub session_id: Uuid,
}

/// Every inbound message kind the gateway understands.
#[derive(Debug)]
pub enum InboundMessage {
    /// A player submits an answer for judgment.
    SubmitAnswer(SubmitAnswerPayload),
    /// A client asks for the current round state.
    SyncGameState(SyncGameStatePayload),
    /// Anything else; carries the offending type tag.
    Unknown(String),
}

/// Parses one inbound text frame.
///
/// # Errors
///
/// Returns `GameError::Parse` when the frame is not a `{type, payload}`
/// envelope at all, and `GameError::Validation` when the envelope is fine
/// but the payload is incomplete for its type.
pub fn parse_inbound(text: &str) -> Result<InboundMessage, GameError> {
    let envelope: InboundEnvelope =
        serde_json::from_str(text).map_err(|e| GameError::Parse(format!("inbound frame: {e}")))?;

    match envelope.kind.as_str() {
        "submitAnswer" => serde_json::from_value(envelope.payload)
            .map(InboundMessage::SubmitAnswer)
            .map_err(|e| GameError::Validation(format!("submitAnswer payload: {e}"))),
        "syncGameState" => serde_json::from_value(envelope.payload)
            .map(InboundMessage::SyncGameState)
            .map_err(|e| GameError::Validation(format!("syncGameState payload: {e}"))),
        _ => Ok(InboundMessage::Unknown(envelope.kind)),
    }
}

/// Every outbound message kind, serialized as `{"type": …, "payload": …}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// A round has started (or a client resynchronized); carries the
    /// player-safe question projection only.
    QuestionStart(QuestionView),
    /// Judgment of one submitted answer.
    #[serde(rename_all = "camelCase")]
    AnswerResult {
        /// Whether the answer was accepted.
        correct: bool,
        /// Points awarded; omitted when the answer was incorrect.
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<u32>,
        /// The turn slot due to answer next.
        next_turn: u32,
    },
    /// Updated team standings.
    #[serde(rename_all = "camelCase")]
    RankingUpdate {
        /// Standings, best first.
        rankings: Vec<RankingEntry>,
    },
    /// The round ended, by completion or timeout.
    #[serde(rename_all = "camelCase")]
    GameOver {
        /// Whether the team cleared the question.
        success: bool,
        /// Answer points plus time bonus.
        total_score: u32,
        /// The time-bonus share of the total.
        time_bonus: u32,
    },
    /// Something went wrong; always structured, never a raw stack trace.
    #[serde(rename_all = "camelCase")]
    Error {
        /// Human-readable description.
        message: String,
        /// Stable machine-readable code.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl OutboundMessage {
    /// Builds the error envelope for a typed engine or protocol failure.
    #[must_use]
    pub fn from_error(error: &GameError) -> Self {
        Self::Error {
            message: error.to_string(),
            code: Some(error.code().to_owned()),
        }
    }

    /// Builds the error envelope naming an unrecognized message type.
    #[must_use]
    pub fn unknown_type(kind: &str) -> Self {
        Self::Error {
            message: format!("unknown message type: {kind}"),
            code: Some("unknown_type".to_owned()),
        }
    }

    /// Builds the catch-all envelope for unexpected internal failures.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::Error {
            message: "internal server error".to_owned(),
            code: Some("internal_error".to_owned()),
        }
    }

    /// The envelope as a JSON value, for fan-out.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Serializing a derived-Serialize enum to a Value is infallible.
        serde_json::to_value(self).expect("outbound envelope serialization is infallible")
    }
}
