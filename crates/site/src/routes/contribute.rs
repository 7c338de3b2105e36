//! Contribution intake route handler.
//!
//! The form page posts JSON here; a plain HTML form post is accepted too. Responses always carry a `message` the
//! page shows verbatim; the assigned ID is only logged.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::extract::{JsonOrForm, JsonOrFormRejection};
use crate::models::contribution::ContributionForm;
use crate::services::contributions::{self, ContributionError};
use crate::state::AppState;

const SUBMITTED: &str = "Contribution submitted successfully";
const FIELDS_REQUIRED: &str = "All fields are required";
const SUBMIT_FAILED: &str = "Failed to submit contribution";

/// Response body for intake.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn message(status: StatusCode, message: &'static str) -> Response {
    (status, Json(MessageResponse { message })).into_response()
}

/// Handle a contribution submission.
///
/// An unreadable body is treated like a missing field.
#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<JsonOrForm<ContributionForm>, JsonOrFormRejection>,
) -> Response {
    let form = match payload {
        Ok(JsonOrForm(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable contribution body");
            return message(StatusCode::BAD_REQUEST, FIELDS_REQUIRED);
        }
    };

    match contributions::submit(state.store(), form).await {
        Ok(_) => message(StatusCode::OK, SUBMITTED),
        Err(ContributionError::MissingField(field)) => {
            tracing::debug!(field, "Contribution rejected");
            message(StatusCode::BAD_REQUEST, FIELDS_REQUIRED)
        }
        Err(e @ ContributionError::Store(_)) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Error submitting contribution");
            message(StatusCode::INTERNAL_SERVER_ERROR, SUBMIT_FAILED)
        }
    }
}
