//! Core types for patron.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contribution_id;
pub mod email;

pub use contribution_id::{ContributionId, ContributionIdError, is_name_separator, resolve_unique_id};
pub use email::{Email, EmailError};
