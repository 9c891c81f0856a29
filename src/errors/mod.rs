use std::io;
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;

/// Custom error types for the wiki application
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("page not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("template error: {0}")]
    Render(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            WikiError::Io(_)
            | WikiError::Database(_)
            | WikiError::Render(_)
            | WikiError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
