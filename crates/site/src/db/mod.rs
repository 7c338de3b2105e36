//! Typed repositories over the document store, plus the `PostgreSQL` pool
//! used for session storage.
//!
//! # Collections
//!
//! - `contributions` - [`ContributionRepository`]
//! - `admins` - [`AdminRepository`]
//!
//! # Session table
//!
//! When `SITE_SESSION_DATABASE_URL` is set, sessions live in
//! `tower_sessions.session`, created via:
//! ```bash
//! cargo run -p patron-cli -- sessions migrate
//! ```

pub mod admins;
pub mod contributions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use admins::AdminRepository;
pub use contributions::ContributionRepository;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
