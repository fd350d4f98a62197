//! Error types for the server

use crate::error::RecommenderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing required features: {0}")]
    MissingFeatures(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RecommenderError> for ServerError {
    fn from(err: RecommenderError) -> Self {
        match err {
            RecommenderError::Validation { missing } => {
                Self::MissingFeatures(missing.join(", "))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::MissingFeatures(names) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required features: {names}"),
            ),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_missing_features() {
        let err = ServerError::from(RecommenderError::Validation {
            missing: vec!["a".to_string(), "b".to_string()],
        });
        match err {
            ServerError::MissingFeatures(names) => assert_eq!(names, "a, b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_map_to_internal() {
        let err = ServerError::from(RecommenderError::ModelNotFitted);
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
