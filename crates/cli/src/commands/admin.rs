//! Stored admin allowlist commands.
//!
//! # Usage
//!
//! ```bash
//! patron admin add ops@example.com
//! patron admin list
//! ```
//!
//! # Environment Variables
//!
//! - `FIREBASE_SERVICE_KEY_B64` - Base64-encoded service-account JSON

use chrono::Utc;
use patron_core::{Email, EmailError};
use patron_site::db::AdminRepository;
use patron_site::store::StoreError;
use thiserror::Error;

use super::{StoreSetupError, open_store};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The store could not be opened.
    #[error(transparent)]
    Setup(#[from] StoreSetupError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Add `email` to the stored allowlist. Re-adding refreshes its timestamp.
pub async fn add(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let store = open_store()?;
    let repo = AdminRepository::new(&store);

    let existed = repo.contains(&email).await?;
    repo.upsert(&email, Utc::now()).await?;

    if existed {
        tracing::info!("Admin {} already listed; timestamp refreshed", email);
    } else {
        tracing::info!("Admin {} added", email);
    }
    Ok(())
}

/// Print every stored admin, most recently added first.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), AdminError> {
    let store = open_store()?;
    let entries = AdminRepository::new(&store).list().await?;

    if entries.is_empty() {
        tracing::info!("No stored admins");
        return Ok(());
    }

    for entry in entries {
        let added = entry
            .added_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default();
        let flag = if entry.parsed_email().is_some() { "" } else { "  (malformed)" };
        println!("{:<40} {added}{flag}", entry.email);
    }
    Ok(())
}
