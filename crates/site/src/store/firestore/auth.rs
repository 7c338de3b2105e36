//! Service-account access tokens for the Firestore REST API.
//!
//! Signs a short-lived JWT assertion with the service account's RSA key and
//! exchanges it at the OAuth token endpoint for a bearer token.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::credentials::ServiceAccount;
use crate::store::StoreError;

/// OAuth scope granting Firestore read/write.
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Grant type for the JWT bearer flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// A bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AccessToken {
    /// Whether the token is expired or close enough to expiry to replace.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.expires_at - REFRESH_MARGIN_SECS
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Build the signed assertion JWT for a service account.
///
/// # Errors
///
/// Returns `StoreError::Auth` if the private key is not a valid RSA PEM.
pub fn sign_assertion(account: &ServiceAccount, now: i64) -> Result<String, StoreError> {
    let key = EncodingKey::from_rsa_pem(account.private_key.expose_secret().as_bytes())
        .map_err(|e| StoreError::Auth(format!("invalid service account key: {e}")))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&account.private_key_id);

    let claims = AssertionClaims {
        iss: &account.client_email,
        scope: DATASTORE_SCOPE,
        aud: &account.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
}

/// Exchange a signed assertion for an access token.
///
/// # Errors
///
/// Returns `StoreError::Auth` if the token endpoint rejects the assertion.
#[instrument(skip(client, account), fields(client_email = %account.client_email))]
pub async fn fetch_access_token(
    client: &reqwest::Client,
    account: &ServiceAccount,
) -> Result<AccessToken, StoreError> {
    let now = chrono::Utc::now().timestamp();
    let assertion = sign_assertion(account, now)?;

    let response = client
        .post(&account.token_uri)
        .form(&TokenRequest {
            grant_type: JWT_BEARER_GRANT,
            assertion: &assertion,
        })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Token exchange failed");
        return Err(StoreError::Auth(format!("token endpoint returned {status}")));
    }

    let token: TokenResponse = response.json().await?;

    tracing::debug!(expires_in = token.expires_in, "Obtained Firestore access token");

    Ok(AccessToken {
        token: SecretString::from(token.access_token),
        expires_at: now + token.expires_in,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation};
    use serde::Deserialize;

    use super::*;

    const SIGNING_KEY: &str = include_str!("../../identity/testdata/signing_key.pem");

    #[derive(Deserialize)]
    struct Decoded {
        iss: String,
        scope: String,
        aud: String,
        iat: i64,
        exp: i64,
    }

    fn account() -> ServiceAccount {
        ServiceAccount {
            project_id: "patron-test".to_string(),
            client_email: "site@patron-test.iam.gserviceaccount.com".to_string(),
            private_key: SecretString::from(SIGNING_KEY.to_string()),
            private_key_id: Some("key-1".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn test_sign_assertion_claims() {
        let now = 1_700_000_000;
        let jwt = sign_assertion(&account(), now).unwrap();

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let data =
            jsonwebtoken::decode::<Decoded>(&jwt, &DecodingKey::from_secret(&[]), &validation)
                .unwrap();

        assert_eq!(data.claims.iss, "site@patron-test.iam.gserviceaccount.com");
        assert_eq!(data.claims.scope, DATASTORE_SCOPE);
        assert_eq!(data.claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(data.claims.iat, now);
        assert_eq!(data.claims.exp, now + ASSERTION_LIFETIME_SECS);
    }

    #[test]
    fn test_sign_assertion_rejects_bad_key() {
        let mut account = account();
        account.private_key = SecretString::from("not a key".to_string());
        assert!(matches!(
            sign_assertion(&account, 0),
            Err(StoreError::Auth(_))
        ));
    }

    #[test]
    fn test_token_expiry_margin() {
        let now = chrono::Utc::now().timestamp();
        let fresh = AccessToken {
            token: SecretString::from("t".to_string()),
            expires_at: now + 3600,
        };
        let nearly = AccessToken {
            token: SecretString::from("t".to_string()),
            expires_at: now + 30,
        };
        assert!(!fresh.is_expired());
        assert!(nearly.is_expired());
    }
}
