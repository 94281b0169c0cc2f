//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use super::metrics;
use crate::memory;

/// Every way a request can fail, with its HTTP mapping.
#[derive(Debug)]
pub enum AppError {
    /// Body was not valid JSON.
    Parse,
    /// Body was JSON but failed validation.
    Validation(String),
    /// No identity cookie.
    Unauthorized,
    /// Requested record does not exist.
    NotFound(String),
    /// The store reported nothing was deleted after the record was found.
    DeleteFailed(String),
    /// Store or backend failure.
    Internal {
        message: String,
        details: Option<String>,
    },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl AppError {
    pub fn internal(message: impl Into<String>, details: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: message.into(),
            details: Some(format!("{details:#}")),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Parse | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DeleteFailed(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code. Authentication failures carry none.
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Parse => Some("parse_error"),
            Self::Validation(_) => Some("validation_error"),
            Self::Unauthorized => None,
            Self::NotFound(_) => Some("not_found"),
            Self::DeleteFailed(_) => Some("delete_failed"),
            Self::Internal { .. } => Some("internal_error"),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Parse => "Invalid JSON in request body",
            Self::Unauthorized => "Not authenticated",
            Self::Validation(msg) | Self::NotFound(msg) | Self::DeleteFailed(msg) => msg,
            Self::Internal { message, .. } => message,
        }
    }
}

impl From<memory::Error> for AppError {
    fn from(err: memory::Error) -> Self {
        match err {
            memory::Error::InvalidType(_) => Self::Validation(err.to_string()),
            other => Self::Internal {
                message: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        if status.is_server_error() {
            error!(code = ?code, error = %self.message(), "Request failed");
        } else {
            warn!(status = %status, code = ?code, error = %self.message(), "Request rejected");
        }
        metrics::record_http_error(code.unwrap_or("unauthorized"));

        let details = match &self {
            Self::Internal { details, .. } => details.as_deref(),
            _ => None,
        };
        let body = ErrorBody {
            error: self.message(),
            code,
            details,
        };
        (status, Json(body)).into_response()
    }
}
