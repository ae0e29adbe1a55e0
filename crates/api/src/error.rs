//! Unified error handling with Sentry integration.
//!
//! Services and handlers return `Result<T, AppError>`. The enum itself knows
//! nothing about HTTP; the `IntoResponse` impl below is the only place where
//! outcomes are mapped to status codes and the JSON error body:
//!
//! ```json
//! { "error": { "code": "product_not_found", "message": "Product not found" } }
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Kinds of document a direct lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Product,
    Photo,
    Comment,
}

impl Resource {
    const fn code(self) -> &'static str {
        match self {
            Self::Product => "product_not_found",
            Self::Photo => "photo_not_found",
            Self::Comment => "comment_not_found",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Photo => "Photo",
            Self::Comment => "Comment",
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A single-document lookup matched nothing.
    #[error("{} not found", .0.label())]
    NotFound(Resource),

    /// Mutating request without a valid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Request payload or path failed validation.
    #[error("Bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    /// Login or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// The document store failed.
    #[error("Store failure: {0}")]
    Store(#[from] RepositoryError),

    /// Reading or writing the session record failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    /// Shorthand for a validation failure.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable error code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(resource) => resource.code(),
            Self::Unauthorized => "unauthorized",
            Self::BadRequest { code, .. } => *code,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::UsernameTaken => "username_taken",
                AuthError::InvalidUsername(_) => "invalid_username",
                AuthError::WeakPassword(_) => "weak_password",
                AuthError::Repository(_) => "store_failure",
                AuthError::PasswordHash => "internal_error",
            },
            Self::Store(_) => "store_failure",
            Self::Session(_) => "session_failure",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UsernameTaken => StatusCode::CONFLICT,
                AuthError::InvalidUsername(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Store(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("invalid_json", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) | Self::Session(_) => "Internal server error".to_string(),
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                "Internal server error".to_string()
            }
            Self::Auth(AuthError::InvalidCredentials) => "Invalid username or password".to_string(),
            Self::Auth(AuthError::UsernameTaken) => "That username is already taken".to_string(),
            Self::Auth(AuthError::WeakPassword(msg)) => msg.clone(),
            Self::Auth(AuthError::InvalidUsername(err)) => err.to_string(),
            Self::BadRequest { message, .. } => message.clone(),
            _ => self.to_string(),
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the logged-in user.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        assert_eq!(
            AppError::NotFound(Resource::Product).to_string(),
            "Product not found"
        );
        assert_eq!(
            AppError::bad_request("invalid_body", "comment body is empty").to_string(),
            "Bad request: comment body is empty"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound(Resource::Photo)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::bad_request("invalid_id", "bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UsernameTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Store(RepositoryError::DataCorruption(
                "bad row".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes_are_distinct_per_kind() {
        assert_eq!(AppError::NotFound(Resource::Comment).code(), "comment_not_found");
        assert_eq!(AppError::Unauthorized.code(), "unauthorized");
        assert_eq!(
            AppError::Store(RepositoryError::Conflict("x".to_string())).code(),
            "store_failure"
        );
    }
}
