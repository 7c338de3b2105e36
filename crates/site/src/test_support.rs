//! Test doubles shared by unit and router tests.

use async_trait::async_trait;

use crate::identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
use crate::store::{Direction, Document, DocumentStore, Fields, StoreError};

/// Accepts tokens of the form `valid:{email}` and [`Self::NO_EMAIL`].
pub struct StubVerifier;

impl StubVerifier {
    /// A token that verifies but carries no email claim.
    pub const NO_EMAIL: &'static str = "valid-no-email";

    /// A token that verifies as `email`.
    pub fn token_for(email: &str) -> String {
        format!("valid:{email}")
    }
}

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        if id_token == Self::NO_EMAIL {
            return Ok(VerifiedIdentity {
                uid: "uid-no-email".to_string(),
                email: None,
                email_verified: false,
            });
        }
        id_token
            .strip_prefix("valid:")
            .map(|email| VerifiedIdentity {
                uid: format!("uid-{email}"),
                email: Some(email.to_string()),
                email_verified: true,
            })
            .ok_or_else(|| IdentityError::Malformed("stub rejects this token".to_string()))
    }
}

/// A store whose every call fails, standing in for an unreachable backend.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        message: "unavailable".to_string(),
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(unavailable())
    }

    async fn set(&self, _collection: &str, _id: &str, _fields: Fields) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Fields,
    ) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn list_ordered(
        &self,
        _collection: &str,
        _field: &str,
        _direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        Err(unavailable())
    }
}
