//! Cloud Firestore REST client.
//!
//! Talks to the `v1` REST surface using a service-account bearer token.
//! Only the handful of calls the site needs are wrapped:
//!
//! - `GET {doc}` - fetch one document
//! - `PATCH {doc}` - create or replace
//! - `PATCH {doc}?updateMask...&currentDocument.exists=true` - partial update
//! - `POST {root}:runQuery` - ordered collection scan

mod auth;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::instrument;

use self::auth::{AccessToken, fetch_access_token};
use self::wire::{ErrorEnvelope, QueryResult, WireDocument, decode_document, encode_fields};
use super::{Direction, Document, DocumentStore, Fields, StoreError};
use crate::credentials::ServiceAccount;

/// Firestore REST API base.
const API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Document store backed by Cloud Firestore.
///
/// Cheap to clone; the HTTP client and token cache are shared.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreInner>,
}

struct FirestoreInner {
    client: reqwest::Client,
    account: ServiceAccount,
    /// `projects/{p}/databases/(default)/documents`
    documents_root: String,
    /// In-memory token cache
    token: RwLock<Option<AccessToken>>,
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("documents_root", &self.inner.documents_root)
            .finish_non_exhaustive()
    }
}

impl FirestoreStore {
    /// Create a store for the service account's project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(account: ServiceAccount) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let documents_root = format!(
            "projects/{}/databases/(default)/documents",
            account.project_id
        );

        Ok(Self {
            inner: Arc::new(FirestoreInner {
                client,
                account,
                documents_root,
                token: RwLock::new(None),
            }),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{API_BASE}/{}/{collection}/{}",
            self.inner.documents_root,
            urlencoding::encode(id)
        )
    }

    /// Return a valid bearer token, fetching a new one if needed.
    async fn bearer(&self) -> Result<String, StoreError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let mut guard = self.inner.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let token = fetch_access_token(&self.inner.client, &self.inner.account).await?;
        let bearer = token.token.expose_secret().to_string();
        *guard = Some(token);
        Ok(bearer)
    }

    /// Turn a non-success response into a `StoreError::Api`.
    async fn api_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or(body, |envelope| envelope.error.message);
        tracing::warn!(status = %status, message = %message, "Firestore request failed");
        StoreError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, StoreError> {
        let bearer = self.bearer().await?;
        let body = WireDocument {
            name: None,
            fields: encode_fields(fields),
        };

        Ok(self
            .inner
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(bearer)
            .query(query)
            .json(&body)
            .send()
            .await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let bearer = self.bearer().await?;
        let response = self
            .inner
            .client
            .get(self.document_url(collection, id))
            .bearer_auth(bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let doc: WireDocument = response.json().await?;
        decode_document(doc).map(Some)
    }

    #[instrument(skip(self, fields))]
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let response = self.patch(collection, id, &fields, &[]).await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut query: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", name.as_str()))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let response = self.patch(collection, id, &fields, &query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        let bearer = self.bearer().await?;
        let direction = match direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": field },
                    "direction": direction,
                }],
            }
        });

        let response = self
            .inner
            .client
            .post(format!("{API_BASE}/{}:runQuery", self.inner.documents_root))
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let results: Vec<QueryResult> = response.json().await?;
        results
            .into_iter()
            .filter_map(|result| result.document)
            .map(decode_document)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn store() -> FirestoreStore {
        FirestoreStore::new(ServiceAccount {
            project_id: "patron-test".to_string(),
            client_email: "site@patron-test.iam.gserviceaccount.com".to_string(),
            private_key: SecretString::from(String::new()),
            private_key_id: None,
            token_uri: "http://127.0.0.1:9/token".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_document_url_encodes_id() {
        let store = store();
        assert_eq!(
            store.document_url("admins", "a+b@example.com"),
            "https://firestore.googleapis.com/v1/projects/patron-test/databases/(default)/documents/admins/a%2Bb%40example.com"
        );
    }

    #[test]
    fn test_debug_omits_credentials() {
        let output = format!("{:?}", store());
        assert!(output.contains("patron-test"));
        assert!(!output.contains("private_key"));
    }

    #[tokio::test]
    async fn test_bad_key_surfaces_as_auth_error() {
        let result = store().get("admins", "x").await;
        assert!(matches!(result, Err(StoreError::Auth(_))));
    }
}
