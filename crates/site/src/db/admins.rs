//! Stored admin allowlist repository.

use chrono::{DateTime, Utc};
use tracing::instrument;

use patron_core::Email;

use crate::models::admin::{ADDED_AT, AdminEntry};
use crate::store::{ADMINS, Direction, DocumentStore, StoreError};

/// Repository for the `admins` collection.
pub struct AdminRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Whether `email` has an entry. The key is matched verbatim.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup fails.
    pub async fn contains(&self, email: &Email) -> Result<bool, StoreError> {
        self.store.exists(ADMINS, email.as_str()).await
    }

    /// Create or overwrite the entry for `email`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn upsert(&self, email: &Email, added_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.store
            .set(ADMINS, email.as_str(), AdminEntry::fields(added_at))
            .await
    }

    /// All entries, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminEntry>, StoreError> {
        let docs = self
            .store
            .list_ordered(ADMINS, ADDED_AT, Direction::Descending)
            .await?;
        Ok(docs.iter().map(AdminEntry::from_document).collect())
    }
}
