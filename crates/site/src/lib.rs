//! Patron site library.
//!
//! Public pages, contribution intake and the admin panel, exposed as a
//! library so the router can be exercised in-process by tests and the CLI
//! can reuse the document store and repositories.
//!
//! # Storage
//!
//! - Contributions and the admin allowlist live in Firestore, reached
//!   through the [`store::DocumentStore`] seam
//! - Sessions live in `PostgreSQL` when configured, in memory otherwise
//!
//! # Authentication
//!
//! Admins sign in with Firebase Authentication. The server verifies the ID
//! token ([`identity`]) and checks the email against the built-in and stored
//! allowlists ([`services::AdminAuthenticator`]).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod extract;
pub mod filters;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
