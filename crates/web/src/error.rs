//! Web error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{auth::session::SessionError, store::StoreError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,
    #[error("Signup is currently disabled")]
    SignupDisabled,

    // Internal errors
    #[error("Database error: {0}")]
    Database(String),
    #[error("Session store error: {0}")]
    SessionStore(String),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            // Browser flow: a denied request is sent to the missing-permission
            // page rather than given a structured error body
            WebError::Unauthorized => Redirect::to("/missingpermission").into_response(),

            WebError::SignupDisabled => {
                (StatusCode::FORBIDDEN, "Signup is currently disabled").into_response()
            }

            // Store failures are logged at the conversion site; the body never
            // carries backend details
            WebError::Database(_) | WebError::SessionStore(_) | WebError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "user store error");
        WebError::Database(err.to_string())
    }
}

impl From<SessionError> for WebError {
    fn from(err: SessionError) -> Self {
        tracing::error!(error = %err, "session store error");
        WebError::SessionStore(err.to_string())
    }
}

/// Result type alias for handlers
pub type WebResult<T> = Result<T, WebError>;
