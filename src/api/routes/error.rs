//! API error handling utilities.

use crate::models::ValidationIssue;
use crate::services::DiagramServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// 400 with field-level detail.
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation failed").with_details(json!(issues))
    }

    /// 500 with a human-readable message.
    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error).with_message(message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn too_many_requests() -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
    }
}

impl From<DiagramServiceError> for ApiError {
    fn from(e: DiagramServiceError) -> Self {
        Self::internal("Generation failed", e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.error });
        if let Some(message) = self.message {
            body["message"] = json!(message);
        }
        if let Some(details) = self.details {
            body["details"] = details;
        }

        (self.status, axum::Json(body)).into_response()
    }
}
