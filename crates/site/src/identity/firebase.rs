//! Firebase Authentication ID-token verifier.
//!
//! Firebase ID tokens are RS256 JWTs signed by rotating Google keys that are
//! published as a JWK set. A token is accepted when:
//!
//! - its `kid` names a published key and the signature checks out
//! - `aud` is the Firebase project ID
//! - `iss` is `https://securetoken.google.com/{project_id}`
//! - `exp` is in the future and `sub` is non-empty
//!
//! Keys are cached for an hour and refetched once when a token names a key
//! we have not seen, which covers Google's key rotation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::Deserialize;
use tracing::instrument;

use super::{IdentityError, IdentityVerifier, VerifiedIdentity};

/// Google's published JWK set for Firebase ID tokens.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix; the project ID is appended.
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// How long fetched keys are trusted before refetching.
const KEY_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

/// Verifies Firebase ID tokens for one project.
#[derive(Clone)]
pub struct FirebaseVerifier {
    inner: Arc<FirebaseVerifierInner>,
}

struct FirebaseVerifierInner {
    client: reqwest::Client,
    project_id: String,
    jwks_url: String,
    keys: Cache<(), Arc<JwkSet>>,
}

impl std::fmt::Debug for FirebaseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseVerifier")
            .field("project_id", &self.inner.project_id)
            .field("jwks_url", &self.inner.jwks_url)
            .finish_non_exhaustive()
    }
}

impl FirebaseVerifier {
    /// Create a verifier for a Firebase project using Google's key endpoint.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_jwks_url(project_id, FIREBASE_JWKS_URL)
    }

    /// Create a verifier that fetches keys from a custom URL.
    #[must_use]
    pub fn with_jwks_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        let keys = Cache::builder()
            .max_capacity(1)
            .time_to_live(KEY_TTL)
            .build();

        Self {
            inner: Arc::new(FirebaseVerifierInner {
                client: reqwest::Client::new(),
                project_id: project_id.into(),
                jwks_url: jwks_url.into(),
                keys,
            }),
        }
    }

    /// Seed the key cache, skipping the first fetch.
    pub async fn preload_keys(&self, keys: JwkSet) {
        self.inner.keys.insert((), Arc::new(keys)).await;
    }

    async fn fetch_keys(&self) -> Result<Arc<JwkSet>, IdentityError> {
        let response = self
            .inner
            .client
            .get(&self.inner.jwks_url)
            .send()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::KeyFetch(format!(
                "key endpoint returned {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        tracing::debug!(count = keys.keys.len(), "Fetched Firebase signing keys");
        Ok(Arc::new(keys))
    }

    async fn keys(&self) -> Result<Arc<JwkSet>, IdentityError> {
        self.inner
            .keys
            .try_get_with((), self.fetch_keys())
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.inner.project_id]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{}", self.inner.project_id)]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    #[instrument(skip(self, id_token))]
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header = jsonwebtoken::decode_header(id_token)
            .map_err(|e| IdentityError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::Malformed(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header.kid.ok_or(IdentityError::MissingKeyId)?;

        let mut keys = self.keys().await?;
        if keys.find(&kid).is_none() {
            tracing::debug!(kid = %kid, "Unknown key id, refetching signing keys");
            self.inner.keys.invalidate(&()).await;
            keys = self.keys().await?;
        }
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| IdentityError::UnknownKey(kid.clone()))?;
        let key = DecodingKey::from_jwk(jwk)?;

        let data = jsonwebtoken::decode::<FirebaseClaims>(id_token, &key, &self.validation())?;
        let claims = data.claims;

        if claims.sub.is_empty() {
            return Err(IdentityError::Malformed("empty subject".to_string()));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
        })
    }
}
