//! Stored admin allowlist entries.

use chrono::{DateTime, Utc};

use patron_core::Email;

use crate::store::{Document, FieldValue, Fields};

/// Field holding the time an entry was (re)added.
pub const ADDED_AT: &str = "addedAt";

/// An email in the stored allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEntry {
    /// Admin email; also the document key.
    pub email: String,
    /// When the entry was last written.
    pub added_at: Option<DateTime<Utc>>,
}

impl AdminEntry {
    /// Fields written for a fresh entry.
    #[must_use]
    pub fn fields(added_at: DateTime<Utc>) -> Fields {
        Fields::from([(ADDED_AT.to_string(), FieldValue::Timestamp(added_at))])
    }

    /// Build from a stored document. The key is kept verbatim, even if it
    /// would not parse as an [`Email`] today.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            email: doc.id.clone(),
            added_at: doc.get(ADDED_AT).and_then(FieldValue::as_timestamp),
        }
    }

    /// The entry's email, if it is well formed.
    #[must_use]
    pub fn parsed_email(&self) -> Option<Email> {
        Email::parse(&self.email).ok()
    }
}
