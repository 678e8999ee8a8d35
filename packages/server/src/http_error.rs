//! HTTP error handling
//!
//! Every failing endpoint answers with the same JSON body so clients can
//! decode errors without knowing which handler produced them.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use taskboard_core::ValidationError;

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INVALID_INPUT: &str = "INVALID_INPUT";

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            NOT_FOUND => StatusCode::NOT_FOUND,
            VALIDATION_ERROR | INVALID_INPUT => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        tracing::warn!("Rejected payload: {}", err);
        HttpError::with_details(err.to_string(), VALIDATION_ERROR, format!("{:?}", err))
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::new(rejection.body_text(), INVALID_INPUT)
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        HttpError::new(rejection.body_text(), INVALID_INPUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::EntityKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HttpError::new("x", NOT_FOUND).status(), StatusCode::NOT_FOUND);
        assert_eq!(HttpError::new("x", VALIDATION_ERROR).status(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::new("x", INVALID_INPUT).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HttpError::new("x", "SOMETHING_ELSE").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: HttpError = ValidationError::invalid_record(EntityKind::Tag, "title: expected string").into();

        assert_eq!(err.code, VALIDATION_ERROR);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.details.is_some());
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let body = serde_json::to_value(HttpError::new("gone", NOT_FOUND)).unwrap();
        assert_eq!(body, serde_json::json!({"message": "gone", "code": "NOT_FOUND"}));
    }
}
