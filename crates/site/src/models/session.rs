//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use patron_core::Email;

/// Session-stored admin identity.
///
/// Only the verified email is kept; allowlist membership is checked once
/// at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentAdmin {
    /// Email the admin signed in with.
    pub email: Email,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const ADMIN: &str = "admin";
}
