//! Admin authentication error types.

use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// Errors that can occur authenticating an admin.
///
/// Every variant means "not signed in"; they differ only in what gets
/// logged.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity token did not verify.
    #[error("invalid identity token: {0}")]
    InvalidToken(#[from] IdentityError),

    /// The verified token carries no email claim.
    #[error("identity token has no email")]
    MissingEmail,

    /// The email claim is not a usable address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] patron_core::EmailError),

    /// The email is in neither allowlist.
    #[error("email is not an admin")]
    NotAllowed,

    /// The stored allowlist could not be consulted.
    #[error("admin lookup failed: {0}")]
    Lookup(#[from] StoreError),
}
