//! Email sending abstraction for verification mail.
//!
//! Implement [`EmailSender`] to provide email delivery, or use the bundled
//! [`ResendMailer`] for the Resend transactional API.

use crate::config::VerifyConfig;
use serde_json::json;
use std::future::Future;
use thiserror::Error;

/// Error type for email sending operations.
#[derive(Debug, Clone, Error)]
pub enum EmailSendError {
    /// Failed to deliver email. Carries the provider's error body.
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// Trait for async email delivery.
///
/// The default implementation (`()`) is a no-op that silently succeeds.
///
/// # Example
///
/// ```rust,ignore
/// use email_verify::{EmailSender, EmailSendError};
///
/// #[derive(Clone)]
/// struct MyEmailService { /* ... */ }
///
/// impl EmailSender for MyEmailService {
///     async fn send(
///         &self,
///         to: &str,
///         subject: &str,
///         html: &str,
///         text: &str,
///     ) -> Result<(), EmailSendError> {
///         // Queue or send email
///         Ok(())
///     }
/// }
/// ```
pub trait EmailSender: Send + Sync + Clone + 'static {
    /// Send an email with HTML and plaintext bodies.
    fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), EmailSendError>> + Send;
}

/// No-op email sender (default).
impl EmailSender for () {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _html: &str,
        _text: &str,
    ) -> Result<(), EmailSendError> {
        Ok(())
    }
}

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Email sender backed by the Resend transactional API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    /// Create a mailer with an API key and sender address.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    /// Create a mailer from the verification configuration.
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(&config.resend_api_key, &config.resend_from)
    }
}

impl EmailSender for ResendMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), EmailSendError> {
        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| EmailSendError::Delivery(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(EmailSendError::Delivery(format!(
            "provider returned {status}: {body}"
        )))
    }
}
