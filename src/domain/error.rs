use std::collections::BTreeMap;

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        /// Per-field error messages, keyed by field name
        fields: BTreeMap<String, String>,
    },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, fields: BTreeMap<String, String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
