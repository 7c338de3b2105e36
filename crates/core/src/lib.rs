//! Patron Core - Shared types library.
//!
//! This crate provides the domain types used across all patron components:
//! - `site` - Public pages, contribution intake and the admin panel
//! - `cli` - Command-line tools for allowlist and session management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! document store access, no HTTP clients. Anything that needs the store
//! takes it through an injected closure (see [`resolve_unique_id`]).
//!
//! # Modules
//!
//! - [`types`] - Validated email addresses and contribution identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
