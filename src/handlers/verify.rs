//! Handler for confirming verification tokens from emailed links.

use crate::{
    Verification,
    email_sender::EmailSender,
    error::VerifyError,
    identity::IdentityService,
    token::verification_token_validate,
};
use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi, ToSchema};

pub const EMAIL_VERIFY_PATH: &str = "/auth/email/verify";

#[derive(OpenApi)]
#[openapi(
    paths(email_verify),
    components(schemas(EmailVerifyQuery, crate::error::VerifyErrorResponse))
)]
pub(crate) struct EmailVerifyApi;

/// Returns routes for the browser verification-link endpoint.
pub fn email_verify_routes<I: IdentityService, E: EmailSender>() -> Router<Verification<I, E>> {
    Router::new().route(EMAIL_VERIFY_PATH, get(email_verify::<I, E>))
}

/// Query for browser-based verification links.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmailVerifyQuery {
    /// Verification token from the emailed link.
    pub token: Option<String>,
}

/// Verify a token and mark the bound account's email as verified.
///
/// Re-submitting a still-valid token re-applies the same terminal state
/// without error; tokens carry no nonce and stay replayable until expiry.
#[utoipa::path(
    get,
    path = "",
    params(EmailVerifyQuery),
    responses(
        (status = OK, body = String),
        (status = FOUND, description = "Redirect to the configured post-verification URL"),
        (status = BAD_REQUEST, body = crate::error::VerifyErrorResponse),
        (status = NOT_FOUND, body = crate::error::VerifyErrorResponse),
        (status = INTERNAL_SERVER_ERROR, body = crate::error::VerifyErrorResponse)
    )
)]
pub async fn email_verify<I: IdentityService, E: EmailSender>(
    State(app): State<Verification<I, E>>,
    Query(query): Query<EmailVerifyQuery>,
) -> Result<Response, VerifyError> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or(VerifyError::MissingToken)?;

    let claims = verification_token_validate(&token, &app.config().verify_secret)?;

    let account = app
        .identity()
        .account_get_by_id(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "account lookup failed");
            VerifyError::AccountNotFound
        })?
        .ok_or(VerifyError::AccountNotFound)?;

    // Single merge-and-write: all other metadata fields are preserved.
    let metadata = account.metadata_mark_verified(Utc::now());
    app.identity()
        .account_metadata_update(&account.id, metadata)
        .await
        .map_err(|e| VerifyError::Update(e.to_string()))?;

    let response = match app.config().redirect_url.as_deref() {
        Some(url) => {
            (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
        }
        None => "Email verified".into_response(),
    };

    Ok(response)
}
