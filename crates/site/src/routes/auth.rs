//! Admin sign-in route handlers.
//!
//! The login page runs the Firebase web SDK's Google sign-in popup and posts
//! the resulting ID token back here. A session is only written once the
//! token verifies and the email is on an allowlist.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::config::FirebaseWebConfig;
use crate::error::AppError;
use crate::extract::{JsonOrForm, JsonOrFormRejection};
use crate::filters;
use crate::middleware::{OptionalAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Generic success body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub signed_in: bool,
    pub firebase: FirebaseWebConfig,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign-in page, or go straight to the panel if already signed in.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAdmin(admin): OptionalAdmin,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/admin").into_response();
    }

    LoginTemplate {
        signed_in: false,
        firebase: state.config().firebase_web.clone(),
    }
    .into_response()
}

/// Exchange a Firebase ID token for an admin session.
///
/// Every failure is a 403 with the same body, whatever the cause.
#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<JsonOrForm<LoginRequest>, JsonOrFormRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let unauthorized = || AppError::Forbidden("Unauthorized".to_string());

    let JsonOrForm(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable login body");
        unauthorized()
    })?;

    let email = state
        .authenticator()
        .authenticate(&request.id_token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Admin sign-in refused");
            unauthorized()
        })?;

    set_current_admin(&session, &CurrentAdmin { email }).await?;

    Ok(Json(SuccessResponse::OK))
}

/// End the admin session.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_admin(&session).await?;
    Ok(Redirect::to("/admin-login"))
}
