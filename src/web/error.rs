use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::services::update_request_service::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("upstream service unavailable")]
    Upstream,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::InvalidPhone
            | RequestError::ReasonTooLong
            | RequestError::NoChanges => AppError::Validation(err.to_string()),
            RequestError::DailyLimit => AppError::RateLimited(err.to_string()),
            RequestError::MasjidNotFound | RequestError::RequestNotFound => {
                AppError::NotFound(err.to_string())
            }
            RequestError::AlreadyProcessed => AppError::Conflict(err.to_string()),
            RequestError::Db(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream => StatusCode::BAD_GATEWAY,
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            AppError::Database(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
