//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Domain errors carry a class and a stable code; the class picks the
//! HTTP status and the code lands in the JSON body, so callers branch
//! on `error.code` rather than message text. Internal details are
//! never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use packhouse_core::{Classified, ErrorClass};
use packhouse_kit::KitError;
use packhouse_label::{LabelError, ScanError};
use packhouse_packing::PackingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "INVALID_CODE",
    /// "COMPONENT_QUANTITY_EXCEEDED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured context, present where the contract promises it
    /// (the shortfall list for "MISSING_COMPONENTS").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// A domain rejection, classified and coded by the domain error.
    #[error("{message}")]
    Domain {
        /// The error class, mapped to an HTTP status.
        class: ErrorClass,
        /// Stable machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
        /// Structured context, if the contract promises one.
        details: Option<serde_json::Value>,
    },

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request failed DTO validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal server error (500). Logged but not returned to clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a domain error from any classified error type.
    pub fn domain<E: Classified + std::fmt::Display>(err: &E) -> Self {
        Self::Domain {
            class: err.class(),
            code: err.code(),
            message: err.to_string(),
            details: None,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &str) {
        match self {
            Self::Domain { class, code, .. } => {
                let status = match class {
                    ErrorClass::NotFound => StatusCode::NOT_FOUND,
                    ErrorClass::IllegalState => StatusCode::CONFLICT,
                    ErrorClass::PolicyViolation => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorClass::Contention => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, code)
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let code = code.to_string();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };
        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match self {
            Self::Domain { details, .. } => details,
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        Self::domain(&err)
    }
}

impl From<LabelError> for AppError {
    fn from(err: LabelError) -> Self {
        Self::domain(&err)
    }
}

impl From<KitError> for AppError {
    fn from(err: KitError) -> Self {
        Self::domain(&err)
    }
}

impl From<PackingError> for AppError {
    fn from(err: PackingError) -> Self {
        // The completion contract promises the shortfall list as
        // structured context, sufficient to render feedback without
        // another query.
        let details = match &err {
            PackingError::MissingComponents { missing } => {
                serde_json::to_value(missing).ok().map(|m| serde_json::json!({ "missing": m }))
            }
            _ => None,
        };
        Self::Domain {
            class: err.class(),
            code: err.code(),
            message: err.to_string(),
            details,
        }
    }
}
