use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    backend::BackendError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Permission denied")]
    Forbidden,

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid form data: {}", err.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::Backend(err) => match err {
                BackendError::NotFound => StatusCode::NOT_FOUND,
                BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
                BackendError::Status { status: 401 | 403, .. } => StatusCode::FORBIDDEN,
                BackendError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
                BackendError::Status { status: 400 | 409 | 422, .. } => StatusCode::BAD_REQUEST,
                BackendError::Duplicate(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Backend(_) if status == StatusCode::FORBIDDEN => "Permission denied".to_string(),
            AppError::Backend(_) if status == StatusCode::NOT_FOUND => "Not Found".to_string(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ApiResponse {
            message,
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
