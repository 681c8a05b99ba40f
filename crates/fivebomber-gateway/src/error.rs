//! HTTP-layer error mapping for the REST routes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use fivebomber_core::error::GameError;

/// JSON body returned for REST error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP wrapper around `GameError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::SessionNotFound(_) | GameError::QuestionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            GameError::TurnConflict { .. } => StatusCode::CONFLICT,
            GameError::Validation(_) | GameError::Parse(_) => StatusCode::BAD_REQUEST,
            GameError::Database(_) | GameError::Connection(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use super::*;

    fn status_of(err: GameError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(GameError::SessionNotFound(Uuid::new_v4())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(GameError::QuestionNotFound("q1".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_turn_conflict_maps_to_409() {
        assert_eq!(
            status_of(GameError::TurnConflict {
                session_id: Uuid::new_v4(),
                expected: 1,
                actual: 2,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_bad_input_maps_to_400() {
        assert_eq!(
            status_of(GameError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GameError::Parse("bad json".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_storage_failures_map_to_500() {
        assert_eq!(
            status_of(GameError::Database("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GameError::Connection("io".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
