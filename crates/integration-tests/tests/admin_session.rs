//! Integration tests for admin sign-in and the session gate.
//!
//! Tests that need a real admin session read `PATRON_ADMIN_ID_TOKEN` and
//! return early when it is unset.
//!
//! Run with: cargo test -p patron-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use patron_integration_tests::{admin_id_token, base_url, client, sign_in};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

// ============================================================================
// Without a session
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_admin_pages_redirect_to_login() {
    let client = client();

    for path in ["/admin", "/admin/view-contributions", "/admin/add-email-page"] {
        let resp = client
            .get(format!("{}{path}", base_url()))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_redirection(), "{path}");
        assert_eq!(resp.headers()[header::LOCATION], "/admin-login");
    }
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_admin_actions_require_session() {
    let client = client();

    let resp = client
        .post(format!("{}/admin/mark-read", base_url()))
        .json(&json!({ "docId": "nobody", "read": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{}/admin/add-email", base_url()))
        .json(&json!({ "email": "intruder@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running site"]
async fn test_forged_token_is_refused() {
    let client = client();
    assert_eq!(
        sign_in(&client, "not-a-real-token").await,
        StatusCode::FORBIDDEN
    );

    let resp = client
        .get(format!("{}/admin", base_url()))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
}

// ============================================================================
// With a session
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site and PATRON_ADMIN_ID_TOKEN"]
async fn test_admin_session_lifecycle() {
    let Some(token) = admin_id_token() else {
        return;
    };
    let client = client();

    assert_eq!(sign_in(&client, &token).await, StatusCode::OK);

    let resp = client
        .get(format!("{}/admin/view-contributions", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/admin/mark-read", base_url()))
        .json(&json!({ "docId": "does-not-exist-integration", "read": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let resp = client
        .post(format!("{}/admin/add-email", base_url()))
        .json(&json!({ "email": "not an email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{}/admin/logout", base_url()))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());

    let resp = client
        .get(format!("{}/admin", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()[header::LOCATION], "/admin-login");
}
