//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatbot_common::response::error_response;

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    InvalidUserId,
    UserNotFound,
    UserDeactivated,
    UserLoadError,
}

impl AuthError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::MissingAuthorization => (
                StatusCode::UNAUTHORIZED,
                "Not authorized to access this route",
            ),
            AuthError::InvalidAuthorizationFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::InvalidUserId => (StatusCode::UNAUTHORIZED, "Invalid user ID in token"),
            AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found"),
            AuthError::UserDeactivated => {
                (StatusCode::UNAUTHORIZED, "User account is deactivated")
            }
            AuthError::UserLoadError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load user")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        error_response(status, message, None)
    }
}
