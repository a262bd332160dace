use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use serde_json::json;
use thiserror::Error;
use types::IdentifierError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid ID: {0:?}")]
    InvalidId(String),

    #[error("Invalid ID: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("Failed to parse json: {0}")]
    Json(#[from] JsonRejection),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, error) = match &self {
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            ServerError::InvalidId(raw) => (
                StatusCode::BAD_REQUEST,
                "Invalid ID",
                Some(format!("{raw:?} is not a 24 character hex identifier")),
            ),
            ServerError::Identifier(e) => {
                (StatusCode::BAD_REQUEST, "Invalid ID", Some(e.to_string()))
            }
            ServerError::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                "Failed to parse json",
                Some(rejection.body_text()),
            ),
            ServerError::Database(e) => {
                log::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(e.to_string()),
                )
            }
        };

        let body = match error {
            Some(error) => json!({
                "status": status.as_u16(),
                "message": message,
                "error": error,
            }),
            None => json!({
                "status": status.as_u16(),
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
