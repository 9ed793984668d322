//! Shared response envelope
//!
//! Every JSON body the API returns, success or failure, has the shape
//! `{success, message, data?, errors?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Wire shape of a success envelope; `data` is `null` when absent
#[derive(Debug, Serialize)]
struct SuccessEnvelope<T> {
    success: bool,
    message: String,
    data: Option<T>,
}

/// Wire shape of a failure envelope
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

/// Successful API response wrapped in the shared envelope
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a payload
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// 201 Created with a payload
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiResponse<()> {
    /// 200 OK without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = SuccessEnvelope {
            success: true,
            message: self.message,
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Build a failure envelope. Used by the error types of every crate.
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    errors: Option<Vec<FieldError>>,
) -> Response {
    let body = ErrorEnvelope {
        success: false,
        message: message.into(),
        errors,
    };
    (status, Json(body)).into_response()
}
