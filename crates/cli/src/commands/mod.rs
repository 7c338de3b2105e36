//! CLI subcommands.
//!
//! The `admin` and `contributions` commands talk to Firestore with the same
//! service account the site uses (`FIREBASE_SERVICE_KEY_B64`).

pub mod admin;
pub mod contributions;
pub mod sessions;

use patron_site::credentials::{CredentialsError, ServiceAccount};
use patron_site::store::{FirestoreStore, StoreError};
use thiserror::Error;

/// Errors opening the document store.
#[derive(Debug, Error)]
pub enum StoreSetupError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The service account could not be decoded.
    #[error("Invalid service account: {0}")]
    Credentials(#[from] CredentialsError),

    /// The store client could not be built.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Open the Firestore store from `FIREBASE_SERVICE_KEY_B64`.
pub fn open_store() -> Result<FirestoreStore, StoreSetupError> {
    dotenvy::dotenv().ok();

    let encoded = std::env::var("FIREBASE_SERVICE_KEY_B64")
        .map_err(|_| StoreSetupError::MissingEnvVar("FIREBASE_SERVICE_KEY_B64"))?;
    let account = ServiceAccount::from_base64(&encoded)?;

    tracing::info!(project = %account.project_id, "Connecting to Firestore...");
    Ok(FirestoreStore::new(account)?)
}
