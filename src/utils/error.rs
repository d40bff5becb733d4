use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::word::Severity;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Word library error: {0}")]
    Library(String),

    #[error("Pattern compile error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content rejected: {severity} language is never allowed")]
    Rejected { severity: Severity },

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Library(_) => "library_error",
            AppError::Pattern(_) => "pattern_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Io(_) => "io_error",
            AppError::Rejected { .. } => "content_rejected",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Body handed to the request layer, which picks the status code.
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            AppError::Rejected { severity } => {
                tracing::debug!("Rejected content with severity {}", severity);
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
            }
            other => {
                tracing::debug!("{}", other);
            }
        }

        let message = match self {
            AppError::Validation(msg)
            | AppError::Library(msg)
            | AppError::Config(msg)
            | AppError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        };

        ErrorResponse {
            error: self.error_type().to_string(),
            message,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
