//! Test doubles and harness helpers for exercising the verification endpoints.
//!
//! This module provides an in-memory [`IdentityService`], recording and
//! failing [`EmailSender`] implementations, and a helper that serves a
//! [`Verification`] router on an ephemeral local port so tests can drive it
//! over real HTTP.
//!
//! # Usage
//!
//! ```ignore
//! use email_verify::testing::{MemoryIdentity, RecordingMailer, config_fixture, app_spawn};
//! use email_verify::Verification;
//!
//! #[tokio::test]
//! async fn issues_verification_email() {
//!     let identity = MemoryIdentity::new();
//!     let mailer = RecordingMailer::new();
//!     let verification = Verification::new(config_fixture(), identity.clone())
//!         .expect("valid config")
//!         .with_mailer(mailer.clone());
//!
//!     let base_url = app_spawn(verification).await;
//!     // drive with reqwest ...
//! }
//! ```

use crate::{
    Account, EmailSendError, EmailSender, IdentityService, Verification, VerifyConfig,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from the in-memory identity service.
#[derive(Debug, Error)]
pub enum MemoryIdentityError {
    /// Metadata update targeted an account that does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(String),
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    // bearer credential -> account id
    sessions: HashMap<String, String>,
}

/// In-memory identity service for tests. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryIdentity {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryIdentity {
    /// Create an empty identity store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub fn account_insert(&self, account: Account) {
        let mut state = self.state.lock().expect("memory identity lock");
        state.accounts.insert(account.id.clone(), account);
    }

    /// Register a bearer credential that resolves to the given account.
    pub fn session_insert(&self, bearer: &str, account_id: &str) {
        let mut state = self.state.lock().expect("memory identity lock");
        state
            .sessions
            .insert(bearer.to_string(), account_id.to_string());
    }

    /// Read an account back for assertions.
    pub fn account_get(&self, id: &str) -> Option<Account> {
        let state = self.state.lock().expect("memory identity lock");
        state.accounts.get(id).cloned()
    }
}

impl IdentityService for MemoryIdentity {
    type Error = MemoryIdentityError;

    async fn caller_resolve(&self, bearer: &str) -> Result<Option<Account>, Self::Error> {
        let state = self.state.lock().expect("memory identity lock");
        Ok(state
            .sessions
            .get(bearer)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn account_get_by_id(&self, id: &str) -> Result<Option<Account>, Self::Error> {
        let state = self.state.lock().expect("memory identity lock");
        Ok(state.accounts.get(id).cloned())
    }

    async fn account_metadata_update(
        &self,
        id: &str,
        metadata: Map<String, Value>,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.lock().expect("memory identity lock");
        match state.accounts.get_mut(id) {
            Some(account) => {
                account.metadata = metadata;
                Ok(())
            }
            None => Err(MemoryIdentityError::AccountNotFound(id.to_string())),
        }
    }
}

/// A delivered email captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plaintext body.
    pub text: String,
}

/// Email sender that records every send instead of delivering.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl RecordingMailer {
    /// Create a mailer with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// All emails recorded so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().expect("recording mailer lock").clone()
    }
}

impl EmailSender for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), EmailSendError> {
        self.sent.lock().expect("recording mailer lock").push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Email sender that always fails with the given provider error body.
#[derive(Clone)]
pub struct FailingMailer {
    message: String,
}

impl FailingMailer {
    /// Create a mailer that fails every send with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EmailSender for FailingMailer {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _html: &str,
        _text: &str,
    ) -> Result<(), EmailSendError> {
        Err(EmailSendError::Delivery(self.message.clone()))
    }
}

/// A complete configuration with placeholder credentials for tests.
pub fn config_fixture() -> VerifyConfig {
    VerifyConfig {
        identity_url: "https://identity.example.com".to_string(),
        identity_anon_key: "anon-key".to_string(),
        identity_admin_key: "admin-key".to_string(),
        resend_api_key: "re_test".to_string(),
        resend_from: "noreply@example.com".to_string(),
        verify_url: "https://app.example.com/verify".to_string(),
        verify_secret: "test_secret_key_at_least_32_chars_long".to_string(),
        redirect_url: None,
    }
}

/// An unverified account with a unique id, an email, and empty metadata.
pub fn account_fixture(email: &str) -> Account {
    Account {
        id: uuid::Uuid::new_v4().to_string(),
        email: Some(email.to_string()),
        metadata: Map::new(),
    }
}

/// Serve the verification router on an ephemeral local port.
///
/// Returns the base URL of the spawned server.
pub async fn app_spawn<I: IdentityService, E: EmailSender>(
    verification: Verification<I, E>,
) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let app: axum::Router = verification.routes();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });

    format!("http://{addr}")
}
