//! Integration tests for patron.
//!
//! These run against a live site over HTTP, so every test is `#[ignore]`d.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the site (in another terminal)
//! cargo run -p patron-site
//!
//! # Run integration tests
//! cargo test -p patron-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `PATRON_BASE_URL` - Site URL (default: `http://localhost:8080`)
//! - `PATRON_ADMIN_ID_TOKEN` - A fresh Firebase ID token for an allowlisted
//!   admin; tests needing a session are skipped without it
//!
//! Contribution tests write real documents to the configured project.

use reqwest::Client;

/// Base URL of the site under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("PATRON_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on the redirect itself.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Admin ID token from the environment, if one was provided.
#[must_use]
pub fn admin_id_token() -> Option<String> {
    std::env::var("PATRON_ADMIN_ID_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
}

/// Sign in with `id_token` on `client`. Returns the response status.
///
/// # Panics
///
/// Panics if the request cannot be sent.
#[allow(clippy::expect_used)]
pub async fn sign_in(client: &Client, id_token: &str) -> reqwest::StatusCode {
    client
        .post(format!("{}/admin-login", base_url()))
        .json(&serde_json::json!({ "idToken": id_token }))
        .send()
        .await
        .expect("Failed to post sign-in")
        .status()
}
