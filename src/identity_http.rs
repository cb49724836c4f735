//! HTTP identity service client speaking the GoTrue-style REST dialect.
//!
//! Caller resolution uses the anonymous key plus the caller's own bearer
//! credential; account lookup and metadata updates use the privileged admin
//! key against the admin endpoints.

use crate::config::VerifyConfig;
use crate::identity::{Account, IdentityService};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Errors from the HTTP identity client.
#[derive(Debug, Error)]
pub enum IdentityHttpError {
    /// Transport-level failure reaching the identity service.
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Identity service answered with an unexpected status.
    #[error("identity service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Upstream response body.
        body: String,
    },
}

/// User payload returned by the identity service.
#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Map<String, Value>,
}

impl From<IdentityUser> for Account {
    fn from(user: IdentityUser) -> Self {
        Account {
            id: user.id,
            email: user.email,
            metadata: user.user_metadata,
        }
    }
}

/// HTTP client for the identity service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpIdentity {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    admin_key: String,
}

impl HttpIdentity {
    /// Create a client for the given identity service endpoint and keys.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, admin_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            admin_key: admin_key.into(),
        }
    }

    /// Create a client from the verification configuration.
    pub fn from_config(config: &VerifyConfig) -> Self {
        Self::new(
            &config.identity_url,
            &config.identity_anon_key,
            &config.identity_admin_key,
        )
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }

    fn admin_user_url(&self, id: &str) -> String {
        format!("{}/auth/v1/admin/users/{}", self.base_url, id)
    }
}

async fn status_error(response: reqwest::Response) -> IdentityHttpError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    IdentityHttpError::Status { status, body }
}

impl IdentityService for HttpIdentity {
    type Error = IdentityHttpError;

    async fn caller_resolve(&self, bearer: &str) -> Result<Option<Account>, Self::Error> {
        let response = self
            .http
            .get(self.user_url())
            .bearer_auth(bearer)
            .header("apikey", &self.anon_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let user: IdentityUser = response.json().await?;
                Ok(Some(user.into()))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn account_get_by_id(&self, id: &str) -> Result<Option<Account>, Self::Error> {
        let response = self
            .http
            .get(self.admin_user_url(id))
            .bearer_auth(&self.admin_key)
            .header("apikey", &self.admin_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let user: IdentityUser = response.json().await?;
                Ok(Some(user.into()))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn account_metadata_update(
        &self,
        id: &str,
        metadata: Map<String, Value>,
    ) -> Result<(), Self::Error> {
        let response = self
            .http
            .put(self.admin_user_url(id))
            .bearer_auth(&self.admin_key)
            .header("apikey", &self.admin_key)
            .json(&json!({ "user_metadata": metadata }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(status_error(response).await)
    }
}
