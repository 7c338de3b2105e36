//! Contribution repository.

use chrono::{DateTime, Utc};
use tracing::instrument;

use patron_core::ContributionId;

use crate::models::contribution::{Contribution, NewContribution, fields};
use crate::store::{CONTRIBUTIONS, Direction, DocumentStore, FieldValue, Fields, StoreError};

/// Repository for the `contributions` collection.
pub struct ContributionRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ContributionRepository<'a> {
    /// Create a new contribution repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Whether a contribution exists at `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the lookup fails.
    pub async fn exists(&self, id: &ContributionId) -> Result<bool, StoreError> {
        self.store.exists(CONTRIBUTIONS, id.as_str()).await
    }

    /// Write a new contribution at `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    #[instrument(skip(self, contribution), fields(id = %id))]
    pub async fn insert(
        &self,
        id: &ContributionId,
        contribution: NewContribution,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.store
            .set(CONTRIBUTIONS, id.as_str(), contribution.into_fields(timestamp))
            .await
    }

    /// All contributions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_newest_first(&self) -> Result<Vec<Contribution>, StoreError> {
        let docs = self
            .store
            .list_ordered(CONTRIBUTIONS, fields::TIMESTAMP, Direction::Descending)
            .await?;
        Ok(docs.iter().map(Contribution::from_document).collect())
    }

    /// Set the `read` flag on an existing contribution.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no contribution at `id`;
    /// nothing is created in that case.
    #[instrument(skip(self))]
    pub async fn set_read(&self, id: &str, read: bool) -> Result<(), StoreError> {
        let update = Fields::from([(fields::READ.to_string(), FieldValue::Boolean(read))]);
        self.store.update(CONTRIBUTIONS, id, update).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    fn contribution(name: &str) -> NewContribution {
        NewContribution {
            name: name.to_string(),
            contact: "c".to_string(),
            day: "Sat".to_string(),
            time: "18:00".to_string(),
            amount: "10".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let repo = ContributionRepository::new(&store);

        for (name, secs) in [("A", 100), ("B", 300), ("C", 200)] {
            let id = ContributionId::from_name(name).unwrap();
            repo.insert(&id, contribution(name), Utc.timestamp_opt(secs, 0).unwrap())
                .await
                .unwrap();
        }

        let names: Vec<String> = repo
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_set_read_round_trip() {
        let store = MemoryStore::new();
        let repo = ContributionRepository::new(&store);
        let id = ContributionId::from_name("Alice").unwrap();
        repo.insert(&id, contribution("Alice"), Utc::now())
            .await
            .unwrap();

        repo.set_read("Alice", true).await.unwrap();
        assert!(repo.list_newest_first().await.unwrap()[0].read);

        repo.set_read("Alice", false).await.unwrap();
        assert!(!repo.list_newest_first().await.unwrap()[0].read);
    }

    #[tokio::test]
    async fn test_set_read_on_missing_creates_nothing() {
        let store = MemoryStore::new();
        let repo = ContributionRepository::new(&store);

        let result = repo.set_read("ghost", true).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.len(CONTRIBUTIONS).await, 0);
    }
}
