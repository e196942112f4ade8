//! # Application Error
//!
//! Maps store errors to structured HTTP responses with proper status codes
//! and error bodies.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

const TRACING_TARGET: &str = "cds_server::error";

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request, illegal id or path, or an interrupted upload.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The uploaded archive could not be extracted.
    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Not implemented.")]
    NotImplemented,

    /// Failure with a status chosen by a lower layer, e.g. an exceeded body limit.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::Status { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::Status {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<cds_store::Error> for AppError {
    fn from(err: cds_store::Error) -> Self {
        use cds_store::Error;

        match err {
            Error::InvalidId(_) | Error::InvalidPath(_) => Self::BadRequest(err.to_string()),
            Error::NotFound(_) => Self::NotFound(err.to_string()),
            Error::Unpack { .. } => Self::UnsupportedMediaType(err.to_string()),
            Error::Receive { ref source, .. } => {
                let status = source
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<MultipartError>())
                    .map(MultipartError::status)
                    .unwrap_or(StatusCode::BAD_REQUEST);
                Self::Status {
                    status,
                    message: err.to_string(),
                }
            }
            other => {
                tracing::error!(target: TRACING_TARGET, error = %other, "content store failure");
                Self::Internal(other.to_string())
            }
        }
    }
}
