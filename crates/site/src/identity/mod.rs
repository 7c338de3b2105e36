//! Identity-token verification.
//!
//! The browser signs in with Firebase Authentication and posts the resulting
//! ID token. A verifier checks the token and yields the identity it asserts;
//! deciding whether that identity is an admin happens elsewhere.

pub mod firebase;

use async_trait::async_trait;
use thiserror::Error;

pub use firebase::FirebaseVerifier;

/// The identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider user ID (`sub`).
    pub uid: String,
    /// Email claim, if the provider supplied one.
    pub email: Option<String>,
    /// Whether the provider verified the email.
    pub email_verified: bool,
}

/// Errors that can occur verifying an identity token.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token is not a well-formed JWT.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token header names no signing key.
    #[error("token has no key id")]
    MissingKeyId,

    /// No published key matches the token's key ID.
    #[error("unknown signing key {0}")]
    UnknownKey(String),

    /// Signature, expiry, audience or issuer check failed.
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    /// The public keys could not be fetched.
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Verifies identity tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Verify a token and return the identity it asserts.
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}
