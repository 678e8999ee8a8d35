//! Service Layer Error Types
//!
//! Errors surfaced by the client façade. Handler misses are not errors and
//! never show up here; the only lookup failure is [`TasksServiceError::NotFound`]
//! from `get_task_by_id`.

use crate::models::ValidationError;
use std::time::Duration;
use thiserror::Error;

/// Client façade errors
#[derive(Error, Debug)]
pub enum TasksServiceError {
    /// Task not present in the cached snapshot
    #[error("Could not find task with id of {id}")]
    NotFound { id: String },

    /// Payload rejected by the backend handlers
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backend answered with a non-success status
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// No response within the configured request timeout
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The request could not be delivered
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be decoded
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// Rejected service configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TasksServiceError {
    /// Create a task not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for TasksServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TasksServiceError>;
