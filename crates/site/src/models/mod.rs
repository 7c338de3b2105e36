//! Domain models for the site.

pub mod admin;
pub mod contribution;
pub mod session;

pub use admin::AdminEntry;
pub use contribution::{Contribution, NewContribution};
pub use session::{CurrentAdmin, keys as session_keys};
