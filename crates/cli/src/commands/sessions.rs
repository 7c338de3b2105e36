//! Session database commands.
//!
//! The site does not create its session table on startup. Run this once per
//! database before setting `SITE_SESSION_DATABASE_URL`.
//!
//! # Environment Variables
//!
//! - `SITE_SESSION_DATABASE_URL` - `PostgreSQL` connection string

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use patron_site::db;

/// Errors that can occur migrating the session store.
#[derive(Debug, Error)]
pub enum SessionsError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the `tower_sessions.session` table if it does not exist.
pub async fn migrate() -> Result<(), SessionsError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITE_SESSION_DATABASE_URL")
        .map_err(|_| SessionsError::MissingEnvVar("SITE_SESSION_DATABASE_URL"))?;

    tracing::info!("Connecting to session database...");
    let pool = db::create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session table ready");
    Ok(())
}
