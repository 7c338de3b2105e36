//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Firebase ID-token sign-in against the admin allowlists
//! - `contributions` - Contribution intake with unique ID assignment

pub mod auth;
pub mod contributions;

pub use auth::{AdminAuthenticator, AdminSource, AuthError, BuiltinAllowlist, StoredAllowlist};
pub use contributions::{ContributionError, submit};
