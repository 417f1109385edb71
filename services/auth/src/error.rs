use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid email or phone number")]
    InvalidIdentifier,
    #[error("verification code must be 6 digits")]
    InvalidCodeFormat,
    #[error("name must be 1 to 50 characters")]
    InvalidName,
    /// Wrong, expired and already-used codes all map here.
    #[error("invalid or expired verification code")]
    InvalidCode,
    #[error("user not found")]
    UserNotFound,
    #[error("already registered")]
    AlreadyRegistered,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidCodeFormat => "INVALID_CODE_FORMAT",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidCode => "INVALID_CODE",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidIdentifier | Self::InvalidCodeFormat | Self::InvalidName => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCode => StatusCode::UNAUTHORIZED,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s are logged here; TraceLayer already records status for every request.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Failure of an outbound delivery channel. Never surfaced to HTTP callers:
/// issuance logs it and reports the code as undelivered.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid mail address: {0}")]
    Address(String),
    #[error("mail transport failed: {0}")]
    Mail(String),
    #[error("sms gateway failed: {0}")]
    Sms(String),
}
