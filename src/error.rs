use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Email verification errors.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    AccountNotFound,

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("email delivery failed: {0}")]
    Delivery(String),

    #[error("failed to update user: {0}")]
    Update(String),
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct VerifyErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            VerifyError::MissingCredential => (StatusCode::UNAUTHORIZED, self.to_string()),
            VerifyError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            VerifyError::MissingToken => (StatusCode::BAD_REQUEST, self.to_string()),
            VerifyError::InvalidToken => (StatusCode::BAD_REQUEST, self.to_string()),
            VerifyError::TokenExpired => (StatusCode::BAD_REQUEST, self.to_string()),
            VerifyError::AccountNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            VerifyError::Jwt(_) => (StatusCode::BAD_REQUEST, "Invalid token".to_string()),
            // Upstream error bodies are surfaced for diagnosis.
            VerifyError::Delivery(ref msg) => {
                tracing::error!("Email delivery failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            VerifyError::Update(ref msg) => {
                tracing::error!("Account update failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: VerifyError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn error_statuses_are_deterministic() {
        assert_eq!(
            status_of(VerifyError::MissingCredential),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(VerifyError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(VerifyError::MissingToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(VerifyError::InvalidToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(VerifyError::TokenExpired), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(VerifyError::AccountNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(VerifyError::Delivery("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(VerifyError::Update("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
