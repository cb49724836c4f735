//! # email-verify
//!
//! Signed-token email verification for Axum, backed by a pluggable identity
//! service and email sender.
//!
//! ## Features
//!
//! - **HS256 verification tokens** (standard compact JWTs, 24-hour expiry)
//! - **Issuer endpoint** that mints a token and emails a verification link
//! - **Verifier endpoint** that validates the token and marks the account verified
//! - **Extensible [`IdentityService`] trait** for any account store
//! - **Extensible [`EmailSender`] trait**, with a bundled Resend implementation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use email_verify::{HttpIdentity, ResendMailer, Verification, VerifyConfig};
//! use axum::Router;
//!
//! let config = VerifyConfig::from_env()?;
//! let identity = HttpIdentity::from_config(&config);
//! let mailer = ResendMailer::from_config(&config);
//!
//! let verification = Verification::new(config, identity)?.with_mailer(mailer);
//!
//! let app: Router = verification.routes();
//! ```
//!
//! ## Endpoints
//!
//! - `POST /auth/email/verify/send` - Email a verification link to the
//!   authenticated caller (requires an `Authorization` bearer credential)
//! - `GET /auth/email/verify?token=...` - Confirm a verification token
//!
//! Tokens are stateless bearer credentials: they are never stored server-side
//! and remain re-submittable until they expire. Re-verifying simply re-applies
//! the already-verified state, which is idempotent.

mod config;
mod email_sender;
mod error;
pub mod handlers;
mod identity;
mod identity_http;
pub mod openapi;
pub mod testing;
pub mod token;
mod verification_email;

use axum::Router;
use std::sync::Arc;

pub use config::{VerifyConfig, VerifyConfigError};
pub use email_sender::{EmailSendError, EmailSender, ResendMailer};
pub use error::{VerifyError, VerifyErrorResponse};
pub use identity::{Account, EMAIL_VERIFIED_AT_KEY, EMAIL_VERIFIED_KEY, IdentityService};
pub use identity_http::{HttpIdentity, IdentityHttpError};
pub use verification_email::{IssueOutcome, verification_link_build};

/// Email verification service handle. Cheap to clone.
///
/// # Type Parameters
///
/// - `I`: The identity service implementing [`IdentityService`]
/// - `E`: The email sender implementing [`EmailSender`] (defaults to the no-op `()`)
#[derive(Clone)]
pub struct Verification<I: IdentityService, E: EmailSender = ()> {
    config: Arc<VerifyConfig>,
    identity: I,
    mailer: E,
}

impl<I: IdentityService> Verification<I, ()> {
    /// Create a verification service with the default (no-op) mailer.
    ///
    /// Validates the configuration once; handlers never re-check it.
    pub fn new(config: VerifyConfig, identity: I) -> Result<Self, VerifyConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            identity,
            mailer: (),
        })
    }
}

impl<I: IdentityService, E: EmailSender> Verification<I, E> {
    /// Attach an email sender.
    pub fn with_mailer<NewE: EmailSender>(self, mailer: NewE) -> Verification<I, NewE> {
        Verification {
            config: self.config,
            identity: self.identity,
            mailer,
        }
    }

    /// Returns a router with both verification endpoints.
    ///
    /// Endpoints:
    /// - `POST /auth/email/verify/send` (plus `OPTIONS` preflight)
    /// - `GET /auth/email/verify`
    pub fn routes<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .merge(handlers::email_verify_send_routes::<I, E>())
            .merge(handlers::email_verify_routes::<I, E>())
            .with_state(self.clone())
    }

    /// Returns a reference to the verification configuration.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Returns a reference to the identity service.
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Returns a reference to the email sender.
    pub fn mailer(&self) -> &E {
        &self.mailer
    }
}
