//! Document store abstraction.
//!
//! The site keeps all persistent data in a schemaless document database
//! addressed by `collection/id`. Production uses Cloud Firestore over REST
//! ([`FirestoreStore`]); tests and local development use [`MemoryStore`].
//!
//! # Collections
//!
//! - `contributions` - Visitor submissions, keyed by a name-derived slug
//! - `admins` - Stored admin allowlist, keyed by email address

pub mod firestore;
pub mod memory;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Collection holding visitor contributions.
pub const CONTRIBUTIONS: &str = "contributions";

/// Collection holding the stored admin allowlist.
pub const ADMINS: &str = "admins";

/// Errors that can occur talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connection, timeout, body decoding).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// An update targeted a document that does not exist.
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Obtaining an access token failed.
    #[error("store authentication failed: {0}")]
    Auth(String),

    /// A document did not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the timestamp payload, if this is a timestamp.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Compare two values of the same type. Mixed types are unordered.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Field map of a document.
pub type Fields = BTreeMap<String, FieldValue>;

/// A stored document with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document key within its collection.
    pub id: String,
    /// Stored fields.
    pub fields: Fields,
}

impl Document {
    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A collection-of-documents database.
///
/// Every method is a single remote round trip; none of them retries.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetch a document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or fully replace a document.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Overwrite the given fields of an existing document, leaving the rest.
    ///
    /// Fails with [`StoreError::NotFound`] instead of creating the document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// All documents that have `field`, sorted by it.
    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError>;

    /// Whether a document exists.
    async fn exists(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self.get(collection, id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_same_type() {
        assert_eq!(
            FieldValue::Integer(1).compare(&FieldValue::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::String("b".into()).compare(&FieldValue::String("a".into())),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_mixed_types_is_unordered() {
        assert_eq!(
            FieldValue::Integer(1).compare(&FieldValue::String("1".into())),
            None
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(FieldValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Null.as_str(), None);
        assert!(FieldValue::Integer(3).as_timestamp().is_none());
    }
}
