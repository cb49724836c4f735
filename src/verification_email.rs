//! Verification email issuance: token mint, link build, and delivery.

use crate::{
    Verification,
    config::VerifyConfig,
    email_sender::{EmailSendError, EmailSender},
    error::VerifyError,
    identity::{Account, IdentityService},
    token::{TOKEN_LIFETIME_SECS, verification_token_mint},
};

/// Outcome of a verification-email issuance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// The account was already verified; nothing was minted or sent.
    AlreadyVerified,
    /// A token was minted and the email was handed to the mailer.
    Sent,
}

impl IssueOutcome {
    /// Status string reported to API clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyVerified => "already_verified",
            Self::Sent => "sent",
        }
    }
}

/// Build the verification link for a token.
///
/// Compact JWTs only contain base64url characters and dots, all safe in a
/// query value, so the token is appended without escaping.
pub fn verification_link_build(config: &VerifyConfig, token: &str) -> String {
    format!("{}?token={}", config.verify_url, token)
}

pub(crate) struct VerificationEmail {
    pub subject: &'static str,
    pub html: String,
    pub text: String,
}

pub(crate) fn verification_email_render(link: &str) -> VerificationEmail {
    let hours = TOKEN_LIFETIME_SECS / 3600;
    let html = format!(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 24px;\">\
         <h2>Confirm your email address</h2>\
         <p>Thanks for signing up. Click the button below to verify your email address.</p>\
         <p style=\"margin: 32px 0;\"><a href=\"{link}\" \
         style=\"background-color: #00796b; color: #ffffff; padding: 12px 28px; \
         text-decoration: none; border-radius: 6px;\">Verify email address</a></p>\
         <p style=\"color: #888; font-size: 13px;\">This link expires in {hours} hours. \
         If you did not request this email, you can safely ignore it.</p>\
         </div>"
    );
    let text = format!(
        "Thanks for signing up. Verify your email address by opening this link:\n\n\
         {link}\n\n\
         This link expires in {hours} hours. If you did not request this email, \
         you can safely ignore it."
    );

    VerificationEmail {
        subject: "Confirm your email address",
        html,
        text,
    }
}

/// Issue a verification token for an account and send the verification email.
///
/// Already-verified accounts short-circuit without minting or sending.
/// Delivery failures are returned to the caller with the provider's error body.
pub(crate) async fn verification_email_send_for_account<I: IdentityService, E: EmailSender>(
    app: &Verification<I, E>,
    account: &Account,
) -> Result<IssueOutcome, VerifyError> {
    if account.email_verified() {
        return Ok(IssueOutcome::AlreadyVerified);
    }

    let email = account.email.as_deref().ok_or(VerifyError::Unauthenticated)?;
    let config = app.config();

    let token = verification_token_mint(&account.id, email, &config.verify_secret)?;
    let link = verification_link_build(config, &token);

    tracing::info!(to = email, "sending verification email");

    let message = verification_email_render(&link);
    app.mailer()
        .send(email, message.subject, &message.html, &message.text)
        .await
        .map_err(|EmailSendError::Delivery(body)| VerifyError::Delivery(body))?;

    Ok(IssueOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_verify_url(url: &str) -> VerifyConfig {
        VerifyConfig {
            identity_url: "https://identity.example.com".to_string(),
            identity_anon_key: "anon".to_string(),
            identity_admin_key: "admin".to_string(),
            resend_api_key: "re_123".to_string(),
            resend_from: "noreply@example.com".to_string(),
            verify_url: url.to_string(),
            verify_secret: "s".repeat(32),
            redirect_url: None,
        }
    }

    #[test]
    fn link_appends_token_as_query_parameter() {
        let config = config_with_verify_url("https://app.example.com/verify");
        let link = verification_link_build(&config, "eyJh.eyJz.c2ln");
        assert_eq!(link, "https://app.example.com/verify?token=eyJh.eyJz.c2ln");
    }

    #[test]
    fn rendered_email_contains_link_in_both_bodies() {
        let message = verification_email_render("https://app.example.com/verify?token=abc");
        assert!(message.html.contains("https://app.example.com/verify?token=abc"));
        assert!(message.text.contains("https://app.example.com/verify?token=abc"));
        assert!(message.text.contains("24 hours"));
    }

    #[test]
    fn outcome_status_strings() {
        assert_eq!(IssueOutcome::AlreadyVerified.as_str(), "already_verified");
        assert_eq!(IssueOutcome::Sent.as_str(), "sent");
    }
}
