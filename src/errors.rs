use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid path")]
    InvalidPath,
    #[error("{0}")]
    BadQuery(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("data format error: {0}")]
    DataFormat(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidPath => "InvalidPath",
            AppError::BadQuery(_) => "BadQuery",
            AppError::NotFound(_) => "NotFound",
            AppError::DataFormat(_) => "DataFormat",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidPath | AppError::BadQuery(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DataFormat(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server faults carry filesystem detail, so only client errors keep their message.
    pub fn is_fault(&self) -> bool {
        matches!(self, AppError::DataFormat(_) | AppError::Internal(_))
    }

    /// Replaces fault detail with `generic`; the original is logged.
    pub fn masked(self, generic: &str) -> MaskedError {
        if self.is_fault() {
            tracing::error!(code = self.code(), error = %self, "{generic}");
            MaskedError { code: self.code(), status: self.status(), message: generic.to_string() }
        } else {
            MaskedError { code: self.code(), status: self.status(), message: self.to_string() }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for AppError {
    fn from(e: arrow::error::ArrowError) -> Self {
        AppError::DataFormat(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// An error already stripped of anything the caller should not see.
#[derive(Debug)]
pub struct MaskedError {
    pub code: &'static str,
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for MaskedError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { code: self.code, message: self.message })).into_response()
    }
}
