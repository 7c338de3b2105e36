//! Contribution intake.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use patron_core::{ContributionId, resolve_unique_id};

use crate::db::ContributionRepository;
use crate::models::contribution::{ContributionForm, NewContribution};
use crate::store::{DocumentStore, StoreError};

/// Errors that can occur submitting a contribution.
#[derive(Debug, Error)]
pub enum ContributionError {
    /// A required field is missing or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The store could not be read or written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Validate and persist a submission, returning the identifier it was
/// stored under.
///
/// The identifier is derived from the submitter's name and made unique by
/// probing `name`, `name-2`, `name-3`, ... This is not atomic: two
/// concurrent submissions with the same name can resolve to the same
/// identifier, and the later write wins.
///
/// # Errors
///
/// Returns `ContributionError::MissingField` without touching the store if
/// any field is missing or blank, and `ContributionError::Store` if a
/// lookup or the write fails.
#[instrument(skip(store, form))]
pub async fn submit(
    store: &dyn DocumentStore,
    form: ContributionForm,
) -> Result<ContributionId, ContributionError> {
    let contribution = NewContribution::from_form(form).map_err(ContributionError::MissingField)?;
    let base = ContributionId::from_name(&contribution.name)
        .map_err(|_| ContributionError::MissingField("name"))?;

    let repo = ContributionRepository::new(store);
    let id = resolve_unique_id(&base, |candidate| {
        let repo = &repo;
        async move { repo.exists(&candidate).await }
    })
    .await?;

    repo.insert(&id, contribution, Utc::now()).await?;

    tracing::info!(id = %id, "Contribution stored");
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::contribution::fields;
    use crate::store::{CONTRIBUTIONS, FieldValue, MemoryStore};
    use crate::test_support::FailingStore;

    fn form(name: &str) -> ContributionForm {
        ContributionForm {
            name: Some(name.to_string()),
            contact: Some("555-0100".to_string()),
            day: Some("Saturday".to_string()),
            time: Some("18:00".to_string()),
            amount: Some("20".to_string()),
        }
    }

    #[tokio::test]
    async fn test_same_name_gets_suffixes() {
        let store = MemoryStore::new();

        let first = submit(&store, form("Alice")).await.unwrap();
        let second = submit(&store, form("Alice")).await.unwrap();
        let third = submit(&store, form("Alice")).await.unwrap();

        assert_eq!(first.as_str(), "Alice");
        assert_eq!(second.as_str(), "Alice-2");
        assert_eq!(third.as_str(), "Alice-3");
        assert_eq!(store.len(CONTRIBUTIONS).await, 3);
    }

    #[tokio::test]
    async fn test_name_is_slugged() {
        let store = MemoryStore::new();
        let id = submit(&store, form("  Bo  Jones ")).await.unwrap();
        assert_eq!(id.as_str(), "Bo_Jones");

        let doc = store.get(CONTRIBUTIONS, "Bo_Jones").await.unwrap().unwrap();
        assert_eq!(
            doc.get(fields::NAME).and_then(FieldValue::as_str),
            Some("  Bo  Jones ")
        );
        assert!(doc.get(fields::TIMESTAMP).is_some());
        assert!(doc.get(fields::READ).is_none());
    }

    #[tokio::test]
    async fn test_missing_field_writes_nothing() {
        let store = MemoryStore::new();
        let mut incomplete = form("Alice");
        incomplete.day = None;

        let result = submit(&store, incomplete).await;
        assert!(matches!(result, Err(ContributionError::MissingField("day"))));
        assert_eq!(store.len(CONTRIBUTIONS).await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let result = submit(&FailingStore, form("Alice")).await;
        assert!(matches!(result, Err(ContributionError::Store(_))));
    }
}
