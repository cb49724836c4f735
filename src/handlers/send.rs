//! Handler for issuing verification emails.

use crate::{
    Verification,
    email_sender::EmailSender,
    error::VerifyError,
    identity::IdentityService,
    verification_email::verification_email_send_for_account,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::post,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

pub const EMAIL_VERIFY_SEND_PATH: &str = "/auth/email/verify/send";

#[derive(OpenApi)]
#[openapi(
    paths(email_verify_send),
    components(schemas(EmailVerifySendResponse, crate::error::VerifyErrorResponse))
)]
pub(crate) struct EmailVerifySendApi;

/// Returns routes for the verification-email issuance endpoint.
///
/// The `OPTIONS` route answers CORS preflight requests with a plain `"ok"`.
pub fn email_verify_send_routes<I: IdentityService, E: EmailSender>()
-> Router<Verification<I, E>> {
    Router::new().route(
        EMAIL_VERIFY_SEND_PATH,
        post(email_verify_send::<I, E>).options(email_verify_preflight),
    )
}

/// Response for a verification-email issuance request.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmailVerifySendResponse {
    /// `"sent"` when an email went out, `"already_verified"` when nothing was needed.
    pub status: String,
}

async fn email_verify_preflight() -> &'static str {
    "ok"
}

/// Issue a verification token for the authenticated caller and email the link.
///
/// Short-circuits with `already_verified` when the caller's email is already
/// confirmed; issuance is idempotent in that case.
#[utoipa::path(
    post,
    path = "",
    responses(
        (status = OK, body = EmailVerifySendResponse),
        (status = UNAUTHORIZED, body = crate::error::VerifyErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::VerifyErrorResponse)
    )
)]
pub async fn email_verify_send<I: IdentityService, E: EmailSender>(
    State(app): State<Verification<I, E>>,
    headers: HeaderMap,
) -> Result<Json<EmailVerifySendResponse>, VerifyError> {
    // Authentication comes before everything else.
    let bearer = bearer_credential_extract(&headers)?;

    let account = app
        .identity()
        .caller_resolve(bearer)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "caller resolution failed");
            VerifyError::Unauthenticated
        })?
        .ok_or(VerifyError::Unauthenticated)?;

    // An account without an email on file cannot be verified.
    if account.email.is_none() {
        return Err(VerifyError::Unauthenticated);
    }

    let outcome = verification_email_send_for_account(&app, &account).await?;

    Ok(Json(EmailVerifySendResponse {
        status: outcome.as_str().to_string(),
    }))
}

/// Extract the bearer credential from the `Authorization` header.
///
/// Accepts the credential with or without a `Bearer ` prefix.
fn bearer_credential_extract(headers: &HeaderMap) -> Result<&str, VerifyError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(VerifyError::MissingCredential)?;
    let value = value
        .to_str()
        .map_err(|_| VerifyError::MissingCredential)?;
    let credential = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if credential.is_empty() {
        return Err(VerifyError::MissingCredential);
    }
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_authorization_header_is_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_credential_extract(&headers),
            Err(VerifyError::MissingCredential)
        ));
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let headers = headers_with_authorization("Bearer abc123");
        assert_eq!(bearer_credential_extract(&headers).unwrap(), "abc123");
    }

    #[test]
    fn bare_credential_is_accepted() {
        let headers = headers_with_authorization("abc123");
        assert_eq!(bearer_credential_extract(&headers).unwrap(), "abc123");
    }

    #[test]
    fn empty_credential_is_rejected() {
        let headers = headers_with_authorization("Bearer ");
        assert!(matches!(
            bearer_credential_extract(&headers),
            Err(VerifyError::MissingCredential)
        ));
    }
}
