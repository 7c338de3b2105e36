//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! # Public pages
//! GET  /                          - Home page
//! GET  /gallery                   - Gallery
//! GET  /contribute                - Contribution form
//! GET  /songs                     - Songs
//! GET  /updates                   - Updates
//! POST /submit-contribution       - Contribution intake (JSON)
//!
//! # Auth
//! GET  /admin-login               - Firebase sign-in page
//! POST /admin-login               - Exchange Firebase ID token for a session
//! POST /admin/logout              - End the session
//!
//! # Admin (requires session)
//! GET  /admin                     - Panel
//! GET  /admin/view-contributions  - Contributions, newest first
//! GET  /admin/add-email-page      - Add-admin form
//! POST /admin/mark-read           - Toggle a contribution's read flag (JSON)
//! POST /admin/add-email           - Add an email to the stored allowlist (JSON)
//!
//! # Operations
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (document store reachable)
//! GET  /static/*                  - Static assets
//! ```

pub mod admin;
pub mod auth;
pub mod contribute;
pub mod health;
pub mod pages;


use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_sessions::SessionManagerLayer;
use tower_sessions::service::SignedCookie;

use crate::middleware::{SiteSessionStore, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the public page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/gallery", get(pages::gallery))
        .route("/contribute", get(pages::contribute))
        .route("/songs", get(pages::songs))
        .route("/updates", get(pages::updates))
        .route("/submit-contribution", post(contribute::submit))
}

/// Create the admin routes router (mounted at `/admin`).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::panel))
        .route("/view-contributions", get(admin::view_contributions))
        .route("/add-email-page", get(admin::add_email_page))
        .route("/mark-read", post(admin::mark_read))
        .route("/add-email", post(admin::add_email))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .route("/admin-login", get(auth::login_page).post(auth::login))
        .nest("/admin", admin_routes())
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Assemble the application: routes, static files, sessions and the
/// per-request middleware. Tracing and Sentry layers are added by the
/// binary on top of this.
pub fn app(
    state: AppState,
    session_layer: SessionManagerLayer<SiteSessionStore, SignedCookie>,
) -> Router {
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .with_state(state)
}
