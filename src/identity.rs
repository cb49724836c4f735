//! Identity service abstraction for account lookup and verification state.
//!
//! This module defines the trait seam that lets the verification flow work
//! against any identity provider: one that can resolve a caller from a bearer
//! credential, look an account up by ID with privileged access, and persist a
//! metadata update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

/// Metadata key for the verification flag.
pub const EMAIL_VERIFIED_KEY: &str = "email_verified";

/// Metadata key for the verification timestamp.
pub const EMAIL_VERIFIED_AT_KEY: &str = "email_verified_at";

/// An account owned by the identity service.
///
/// The verification state lives in the metadata map as a flag/timestamp pair:
/// the account counts as verified only when the flag is `true` AND the
/// timestamp is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Opaque unique identifier.
    pub id: String,
    /// Email address on file, if any.
    pub email: Option<String>,
    /// Free-form metadata owned by the application.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Account {
    /// Returns whether the account's email has been verified.
    pub fn email_verified(&self) -> bool {
        let flag = self
            .metadata
            .get(EMAIL_VERIFIED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let stamped = self
            .metadata
            .get(EMAIL_VERIFIED_AT_KEY)
            .is_some_and(|v| !v.is_null());
        flag && stamped
    }

    /// Build the metadata map with verification applied at `now`.
    ///
    /// All existing fields are preserved; only the flag and timestamp are set.
    /// Re-applying to an already-verified account is harmless.
    pub fn metadata_mark_verified(&self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut next = self.metadata.clone();
        next.insert(EMAIL_VERIFIED_KEY.to_string(), Value::Bool(true));
        next.insert(
            EMAIL_VERIFIED_AT_KEY.to_string(),
            Value::String(now.to_rfc3339()),
        );
        next
    }
}

/// Identity service trait for the verification flow.
///
/// Implement this to plug in any system of record for accounts. All three
/// operations are consumed sequentially by the handlers; none are retried.
///
/// # Example
///
/// ```rust,ignore
/// use email_verify::{Account, IdentityService};
///
/// #[derive(Clone)]
/// struct MyIdentity { /* your client */ }
///
/// impl IdentityService for MyIdentity {
///     type Error = MyError;
///
///     async fn caller_resolve(&self, bearer: &str) -> Result<Option<Account>, Self::Error> {
///         // Resolve the credential against your provider
///         Ok(None)
///     }
///     // ... implement other methods
/// }
/// ```
pub trait IdentityService: Clone + Send + Sync + 'static {
    /// Error type for identity operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve the calling account from a bearer credential.
    ///
    /// Returns `None` when the credential does not identify an account.
    fn caller_resolve(
        &self,
        bearer: &str,
    ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send;

    /// Look up an account by its unique ID using privileged access.
    ///
    /// Returns `None` if no account exists with the given ID.
    fn account_get_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send;

    /// Replace the account's metadata in a single write.
    ///
    /// Callers pass a fully merged map; the write must be atomic so a failure
    /// leaves the previous metadata untouched.
    fn account_metadata_update(
        &self,
        id: &str,
        metadata: Map<String, Value>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
