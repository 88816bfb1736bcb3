//! Application error type and its mapping to HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::client::ApiError;
use crate::form::{AttachmentError, GroupError};
use crate::history::HistoryError;

#[derive(Debug, Error)]
pub enum AppError {
    // 400
    #[error("{0}")]
    BadRequest(String),

    // 404
    #[error("{0}")]
    NotFound(String),

    // 409, e.g. removing the last group or submitting twice
    #[error("{0}")]
    Conflict(String),

    // 413
    #[error("{0}")]
    PayloadTooLarge(String),

    // 502, the generation backend failed or refused the request
    #[error("backend request failed: {0}")]
    Upstream(#[from] ApiError),

    // 502, the backend answered but its history could not be read
    #[error("backend returned unreadable quiz history: {0}")]
    MalformedHistory(#[from] HistoryError),

    // 500
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) | AppError::MalformedHistory(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!(target: "quizcraft", error = %msg, "Internal error");
                "Internal Server Error".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::warn!(target: "quizcraft", error = %other, "Request failed");
                }
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<GroupError> for AppError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::LastGroup => AppError::Conflict(err.to_string()),
            GroupError::IndexOutOfRange { .. } => AppError::NotFound(err.to_string()),
            GroupError::CountOutOfRange { .. } => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_errors_map_to_statuses() {
        let last: AppError = GroupError::LastGroup.into();
        assert_eq!(last.into_response().status(), StatusCode::CONFLICT);

        let oob: AppError = GroupError::IndexOutOfRange { index: 4, len: 1 }.into();
        assert_eq!(oob.into_response().status(), StatusCode::NOT_FOUND);

        let count: AppError = GroupError::CountOutOfRange { count: 9 }.into();
        assert_eq!(count.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn history_errors_are_bad_gateway() {
        let err: AppError = HistoryError::PathShape { path: "onlyonepart".into() }.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
