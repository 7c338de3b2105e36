//! Admin authentication service.
//!
//! Admins sign in with Firebase Authentication in the browser; the server
//! verifies the resulting ID token and checks the email against two
//! allowlists in order:
//!
//! 1. [`BuiltinAllowlist`] - fixed at startup from configuration
//! 2. [`StoredAllowlist`] - the `admins` collection
//!
//! The first source that says yes wins, so built-in admins can sign in even
//! when the document store is unreachable.

mod error;

pub use error::AuthError;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use patron_core::Email;

use crate::db::AdminRepository;
use crate::identity::IdentityVerifier;
use crate::store::{DocumentStore, StoreError};

/// A source of admin authorization.
#[async_trait]
pub trait AdminSource: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `email` is an admin according to this source.
    async fn is_admin(&self, email: &Email) -> Result<bool, StoreError>;
}

/// Admins fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct BuiltinAllowlist {
    emails: HashSet<Email>,
}

impl BuiltinAllowlist {
    /// Create an allowlist from a set of emails.
    pub fn new(emails: impl IntoIterator<Item = Email>) -> Self {
        Self {
            emails: emails.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AdminSource for BuiltinAllowlist {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn is_admin(&self, email: &Email) -> Result<bool, StoreError> {
        Ok(self.emails.contains(email))
    }
}

/// Admins listed in the `admins` collection.
#[derive(Clone)]
pub struct StoredAllowlist {
    store: Arc<dyn DocumentStore>,
}

impl StoredAllowlist {
    /// Create a source backed by the document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AdminSource for StoredAllowlist {
    fn name(&self) -> &'static str {
        "stored"
    }

    async fn is_admin(&self, email: &Email) -> Result<bool, StoreError> {
        AdminRepository::new(self.store.as_ref())
            .contains(email)
            .await
    }
}

/// Turns identity tokens into authorized admin emails.
#[derive(Clone)]
pub struct AdminAuthenticator {
    verifier: Arc<dyn IdentityVerifier>,
    sources: Arc<[Box<dyn AdminSource>]>,
}

impl AdminAuthenticator {
    /// Create an authenticator. Sources are consulted in the given order.
    #[must_use]
    pub fn new(verifier: Arc<dyn IdentityVerifier>, sources: Vec<Box<dyn AdminSource>>) -> Self {
        Self {
            verifier,
            sources: sources.into(),
        }
    }

    /// The site's standard chain: built-in emails first, then the `admins`
    /// collection.
    #[must_use]
    pub fn with_allowlists(
        verifier: Arc<dyn IdentityVerifier>,
        builtin: impl IntoIterator<Item = Email>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self::new(
            verifier,
            vec![
                Box::new(BuiltinAllowlist::new(builtin)),
                Box::new(StoredAllowlist::new(store)),
            ],
        )
    }

    /// Verify `id_token` and return the admin email it proves.
    ///
    /// Stops at the first source that recognises the email. A lookup error
    /// from a source fails the whole call, so later sources are only reached
    /// when earlier ones answered "no".
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the token is invalid, carries no usable
    /// email, the email is in no source, or a source lookup fails.
    #[instrument(skip(self, id_token))]
    pub async fn authenticate(&self, id_token: &str) -> Result<Email, AuthError> {
        let identity = self.verifier.verify(id_token).await?;
        let email = Email::parse(identity.email.as_deref().ok_or(AuthError::MissingEmail)?)?;

        for source in self.sources.iter() {
            if source.is_admin(&email).await? {
                tracing::info!(email = %email, source = source.name(), "Admin authenticated");
                return Ok(email);
            }
        }

        tracing::warn!(email = %email, uid = %identity.uid, "Sign-in by non-admin rejected");
        Err(AuthError::NotAllowed)
    }
}
