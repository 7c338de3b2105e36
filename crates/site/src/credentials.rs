//! Google service-account credentials.
//!
//! The deployment supplies one base64-encoded service-account JSON blob. It
//! names the Firebase project (audience for identity tokens) and carries the
//! RSA key used to mint Firestore access tokens.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Default OAuth token endpoint when the key file does not name one.
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Errors decoding the service-account blob.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("service account is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("service account is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("service account field {0} is empty")]
    EmptyField(&'static str),
}

/// Raw key-file layout as downloaded from the Google Cloud console.
#[derive(Deserialize)]
struct KeyFile {
    project_id: String,
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

/// A decoded service account.
///
/// Implements `Debug` manually to redact the private key.
#[derive(Clone)]
pub struct ServiceAccount {
    /// Firebase / Google Cloud project ID.
    pub project_id: String,
    /// Service account email, used as the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: SecretString,
    /// Key ID placed in the JWT header.
    pub private_key_id: Option<String>,
    /// OAuth token endpoint.
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccount {
    /// Decode a base64-encoded service-account JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not base64, not JSON, or is missing
    /// the project ID, client email or private key.
    pub fn from_base64(encoded: &str) -> Result<Self, CredentialsError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_json(&bytes)
    }

    /// Parse a service-account JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a required field is empty.
    pub fn from_json(json: &[u8]) -> Result<Self, CredentialsError> {
        let file: KeyFile = serde_json::from_slice(json)?;

        if file.project_id.is_empty() {
            return Err(CredentialsError::EmptyField("project_id"));
        }
        if file.client_email.is_empty() {
            return Err(CredentialsError::EmptyField("client_email"));
        }
        if file.private_key.is_empty() {
            return Err(CredentialsError::EmptyField("private_key"));
        }

        Ok(Self {
            project_id: file.project_id,
            client_email: file.client_email,
            private_key: SecretString::from(file.private_key),
            private_key_id: file.private_key_id,
            token_uri: file
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}
