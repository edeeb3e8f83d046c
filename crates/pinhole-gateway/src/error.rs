use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::ShortenerError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The request was malformed or failed validation.
    BadRequest(String),
    Shortener(ShortenerError),
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        AppError::Shortener(err)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Shortener(err) => match err {
                ShortenerError::NotFound | ShortenerError::InvalidShortCode(_) => {
                    (StatusCode::NOT_FOUND, "Short URL not found".to_string())
                }
                ShortenerError::Expired => (StatusCode::GONE, "URL has expired".to_string()),
                ShortenerError::GenerationConflict(_) => (
                    StatusCode::CONFLICT,
                    "Could not generate a unique short URL, please try again.".to_string(),
                ),
                ShortenerError::InvalidUrl(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ShortenerError::Storage(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            if let AppError::Shortener(err) = &self {
                error!(error = %err, "Request failed");
            }
        }

        let body = ErrorResponse {
            code: status.as_u16(),
            msg,
        };
        (status, Json(body)).into_response()
    }
}
