//! Admin panel route handlers.
//!
//! Every handler takes [`RequireAdmin`], so nothing here runs without a
//! signed-in admin: page views redirect to the login page and JSON actions
//! get a 401.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use patron_core::Email;

use super::auth::SuccessResponse;
use crate::db::{AdminRepository, ContributionRepository};
use crate::error::AppError;
use crate::extract::{JsonOrForm, JsonOrFormRejection};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::Contribution;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Body for toggling a contribution's read flag.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    #[serde(rename = "docId")]
    pub doc_id: String,
    pub read: bool,
}

/// Body for adding an admin email.
#[derive(Debug, Deserialize)]
pub struct AddEmailRequest {
    pub email: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin panel template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct PanelTemplate {
    pub signed_in: bool,
    pub admin_email: String,
}

/// Contribution list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/contributions.html")]
pub struct ContributionsTemplate {
    pub signed_in: bool,
    pub admin_email: String,
    pub contributions: Vec<Contribution>,
    pub unread_count: usize,
}

/// Add-admin form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/add_email.html")]
pub struct AddEmailTemplate {
    pub signed_in: bool,
    pub admin_email: String,
}

// =============================================================================
// Pages
// =============================================================================

/// Display the admin panel.
pub async fn panel(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    PanelTemplate {
        signed_in: true,
        admin_email: admin.email.into_inner(),
    }
}

/// Display all contributions, newest first.
#[instrument(skip_all)]
pub async fn view_contributions(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let contributions = ContributionRepository::new(state.store())
        .list_newest_first()
        .await?;
    let unread_count = contributions.iter().filter(|c| !c.read).count();

    Ok(ContributionsTemplate {
        signed_in: true,
        admin_email: admin.email.into_inner(),
        contributions,
        unread_count,
    })
}

/// Display the add-admin form.
pub async fn add_email_page(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    AddEmailTemplate {
        signed_in: true,
        admin_email: admin.email.into_inner(),
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Set or clear the read flag on an existing contribution.
///
/// A missing document is a 404; the flag is never written to a new one.
#[instrument(skip_all)]
pub async fn mark_read(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    payload: Result<JsonOrForm<MarkReadRequest>, JsonOrFormRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let JsonOrForm(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    if request.doc_id.is_empty() {
        return Err(AppError::Validation("docId is required".to_string()));
    }

    ContributionRepository::new(state.store())
        .set_read(&request.doc_id, request.read)
        .await?;

    tracing::info!(doc_id = %request.doc_id, read = request.read, "Contribution read flag set");
    Ok(Json(SuccessResponse::OK))
}

/// Add an email to the stored admin allowlist.
///
/// Re-adding an existing email only refreshes its timestamp.
#[instrument(skip_all, fields(added_by = %admin.email))]
pub async fn add_email(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    payload: Result<JsonOrForm<AddEmailRequest>, JsonOrFormRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let JsonOrForm(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let email = Email::parse(request.email.trim())
        .map_err(|e| AppError::Validation(format!("Invalid email: {e}")))?;

    AdminRepository::new(state.store())
        .upsert(&email, Utc::now())
        .await?;

    tracing::info!(email = %email, "Admin email added");
    Ok(Json(SuccessResponse::OK))
}
