//! Identity Error Types
//!
//! Centralized error handling for all identity lifecycle operations.
//! Every failure kind carries a stable localization key so presentation
//! layers can translate messages without depending on this crate's logic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Identity lifecycle errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    AlreadyExists,

    #[error("Invalid activation code")]
    InvalidActivationCode,

    #[error("No account found for this email")]
    UserNotFound,

    #[error("This account has been deleted")]
    AccountDeleted,

    #[error("This account has not been activated")]
    AccountNotActivated,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid reset code")]
    InvalidResetCode,

    #[error("Reset code has expired")]
    ResetCodeExpired,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Mail dispatch error: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Stable message-lookup key for this failure kind.
    ///
    /// Keys are part of the crate's contract: localization bundles are
    /// indexed by them, so they never change between releases.
    pub fn error_key(&self) -> &'static str {
        match self {
            AuthError::AlreadyExists => "error.user.already.exists",
            AuthError::InvalidActivationCode => "error.invalid.activation.code",
            AuthError::UserNotFound => "error.user.not.found",
            AuthError::AccountDeleted => "error.user.account.deleted",
            AuthError::AccountNotActivated => "error.user.account.not.activated",
            AuthError::InvalidPassword => "error.invalid.password",
            AuthError::InvalidResetCode => "error.invalid.reset.code",
            AuthError::ResetCodeExpired => "error.reset.code.expired",
            AuthError::Validation(_) => "error.validation",
            AuthError::Database(_) => "error.internal",
            AuthError::Mail(_) => "error.mail.dispatch",
            AuthError::Config(_) => "error.configuration",
            AuthError::Internal => "error.internal",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::AlreadyExists => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AuthError::InvalidActivationCode => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::AccountDeleted
            | AuthError::AccountNotActivated
            | AuthError::InvalidPassword
            | AuthError::ResetCodeExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InvalidResetCode => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AuthError::Database(_) | AuthError::Mail(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": self.error_key(),
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!("JWT error: {:?}", err);
        AuthError::Internal
    }
}
