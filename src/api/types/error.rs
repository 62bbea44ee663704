//! API error envelope
//!
//! Every error response has the same shape: a machine-readable `error`
//! code, a human-readable `message` and a `details` object (field errors on
//! validation failures, the offending key on conflicts, empty otherwise).
//! Raw storage or internal error text never reaches the client; it is
//! logged and replaced by a fixed classification string.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::domain::DomainError;

/// Error classification exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    ValidationError,
    Conflict,
    NotFound,
    MethodNotAllowed,
    DatabaseError,
    ServerError,
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict"),
            Self::NotFound => write!(f, "not_found"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// JSON body of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorCode,
    pub message: String,
    pub details: BTreeMap<String, Value>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error with empty details
    pub fn new(status: StatusCode, error: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error,
                message: message.into(),
                details: BTreeMap::new(),
            },
        }
    }

    /// Attach a detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.response.details.insert(key.into(), value);
        self
    }

    /// 400 validation error with per-field details
    pub fn validation(message: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        let mut err = Self::new(StatusCode::BAD_REQUEST, ApiErrorCode::ValidationError, message);
        err.response.details = fields
            .into_iter()
            .map(|(field, message)| (field, Value::String(message)))
            .collect();
        err
    }

    /// 409 unique-constraint conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorCode::Conflict, message)
    }

    /// 404 for unknown records or routes
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message)
    }

    /// 405 for known routes with an unsupported method
    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::MethodNotAllowed,
            "method not allowed for this resource",
        )
    }

    /// 500 for a failed storage operation; the cause stays in the log
    pub fn database_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::DatabaseError,
            "database operation failed",
        )
    }

    /// 500 for any other uncaught failure
    pub fn server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::ServerError,
            "internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message, fields } => Self::validation(message, fields),
            DomainError::Conflict { message } => {
                Self::conflict(message.clone()).with_detail("username", Value::String(message))
            }
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Storage { message } => {
                error!(error = %message, "storage failure");
                Self::database_error()
            }
            DomainError::Internal { message } => {
                error!(error = %message, "internal failure");
                Self::server_error()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.error, self.response.message)
    }
}

impl std::error::Error for ApiError {}
