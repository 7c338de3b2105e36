//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_SERVICE_KEY_B64` - Base64-encoded service-account JSON (Firestore + Firebase Auth)
//! - `SITE_SESSION_SECRET` - Session cookie signing secret (min 32 chars, high entropy)
//! - `SITE_BUILTIN_ADMINS` - Comma-separated emails that are always admins (at least one).
//!   These are checked before the `admins` collection, so they can sign in
//!   even when Firestore is unreachable.
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `SITE_BASE_URL` - Public URL; `https://` enables secure cookies (default: `http://localhost:{PORT}`)
//! - `SITE_SESSION_DATABASE_URL` - `PostgreSQL` URL for the session store (in-memory when unset)
//! - `SITE_STATIC_DIR` - Static asset directory (default: crates/site/static)
//! - `FIREBASE_WEB_API_KEY` - Firebase web API key for the admin sign-in page
//! - `FIREBASE_AUTH_DOMAIN` - Firebase auth domain (default: `{project_id}.firebaseapp.com`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use patron_core::Email;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::credentials::{CredentialsError, ServiceAccount};

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_PORT: &str = "8080";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Invalid FIREBASE_SERVICE_KEY_B64: {0}")]
    Credentials(#[from] CredentialsError),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// `PostgreSQL` URL for session storage (contains password)
    pub session_database_url: Option<SecretString>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Service account for Firestore and identity token audience
    pub service_account: ServiceAccount,
    /// Client-side Firebase configuration for the sign-in page
    pub firebase_web: FirebaseWebConfig,
    /// Emails that are admins regardless of the stored allowlist. Never
    /// empty; these are the admins who can sign in without Firestore.
    pub builtin_admins: Vec<Email>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Public Firebase web configuration rendered into the admin sign-in page.
///
/// None of these values are secret; the web API key only identifies the
/// project to Google's client SDK.
#[derive(Debug, Clone)]
pub struct FirebaseWebConfig {
    /// Web API key (sign-in is disabled when absent)
    pub api_key: Option<String>,
    /// Auth domain hosting the sign-in popup
    pub auth_domain: String,
    /// Firebase project ID
    pub project_id: String,
}

impl FirebaseWebConfig {
    fn from_env(project_id: &str) -> Self {
        Self {
            api_key: get_optional_env("FIREBASE_WEB_API_KEY"),
            auth_domain: get_optional_env("FIREBASE_AUTH_DOMAIN")
                .unwrap_or_else(|| format!("{project_id}.firebaseapp.com")),
            project_id: project_id.to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env("SITE_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_BASE_URL".to_string(), e.to_string()))?;

        let session_secret = get_validated_secret("SITE_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SITE_SESSION_SECRET")?;
        let session_database_url = get_optional_env("SITE_SESSION_DATABASE_URL")
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        let static_dir = get_env_or_default("SITE_STATIC_DIR", "crates/site/static").into();

        let service_account =
            ServiceAccount::from_base64(&get_required_env("FIREBASE_SERVICE_KEY_B64")?)?;
        let firebase_web = FirebaseWebConfig::from_env(&service_account.project_id);
        let builtin_admins =
            parse_builtin_admins(&get_required_env("SITE_BUILTIN_ADMINS")?, "SITE_BUILTIN_ADMINS")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            session_database_url,
            static_dir,
            service_account,
            firebase_web,
            builtin_admins,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a comma-separated list of admin emails.
fn parse_admin_list(raw: &str, var_name: &str) -> Result<Vec<Email>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Email::parse(s).map_err(|e| {
                ConfigError::InvalidEnvVar(var_name.to_string(), format!("{s}: {e}"))
            })
        })
        .collect()
}

/// Parse the built-in admin list, which must name at least one admin.
fn parse_builtin_admins(raw: &str, var_name: &str) -> Result<Vec<Email>, ConfigError> {
    let admins = parse_admin_list(raw, var_name)?;
    if admins.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must list at least one admin email".to_string(),
        ));
    }
    Ok(admins)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Configuration used by unit and router tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_config(builtin_admins: &[&str]) -> SiteConfig {
    let service_account = ServiceAccount::from_json(
        br#"{
            "project_id": "patron-test",
            "client_email": "site@patron-test.iam.gserviceaccount.com",
            "private_key": "unused"
        }"#,
    )
    .unwrap();

    SiteConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 8080,
        base_url: "http://localhost:8080".to_string(),
        session_secret: SecretString::from("kT7#pL2@vQ9!mX4$wR8^zN3&bH6*jD0%"),
        session_database_url: None,
        static_dir: "static".into(),
        firebase_web: FirebaseWebConfig::from_env("patron-test"),
        service_account,
        builtin_admins: builtin_admins
            .iter()
            .map(|e| Email::parse(e).unwrap())
            .collect(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-session-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "TEST").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "TEST").is_ok());
    }

    #[test]
    fn test_parse_admin_list() {
        let admins = parse_admin_list(" a@example.com, ,b@example.org ", "TEST").unwrap();
        assert_eq!(admins.len(), 2);
        assert_eq!(admins[0].as_str(), "a@example.com");
        assert_eq!(admins[1].as_str(), "b@example.org");

        assert!(parse_admin_list("", "TEST").unwrap().is_empty());
        assert!(matches!(
            parse_admin_list("a@example.com,nope", "TEST"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_builtin_admins_must_not_be_empty() {
        for raw in ["", " , ,"] {
            assert!(matches!(
                parse_builtin_admins(raw, "SITE_BUILTIN_ADMINS"),
                Err(ConfigError::InvalidEnvVar(_, _))
            ));
        }
        let admins = parse_builtin_admins("owner@example.com", "SITE_BUILTIN_ADMINS").unwrap();
        assert_eq!(admins[0].as_str(), "owner@example.com");
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let mut config = test_config(&[]);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert!(!config.is_secure());

        config.base_url = "https://patron.example".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config(&[]);
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("kT7#pL2@vQ9"));
    }
}
