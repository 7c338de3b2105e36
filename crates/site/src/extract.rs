//! Request body extractors.
//!
//! Browser forms post `application/x-www-form-urlencoded`; the site's own
//! scripts post JSON. Handlers that accept either take [`JsonOrForm`].

use axum::{
    Form, Json,
    extract::{
        FromRequest, Request,
        rejection::{FormRejection, JsonRejection},
    },
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// A body decoded as a url-encoded form when the request says so, and as
/// JSON otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

/// Why a [`JsonOrForm`] body could not be decoded.
#[derive(Debug)]
pub enum JsonOrFormRejection {
    Json(JsonRejection),
    Form(FormRejection),
}

impl JsonOrFormRejection {
    /// Human-readable reason, as the underlying extractor reports it.
    #[must_use]
    pub fn body_text(&self) -> String {
        match self {
            Self::Json(rejection) => rejection.body_text(),
            Self::Form(rejection) => rejection.body_text(),
        }
    }
}

impl std::fmt::Display for JsonOrFormRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.body_text())
    }
}

impl IntoResponse for JsonOrFormRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Json(rejection) => rejection.into_response(),
            Self::Form(rejection) => rejection.into_response(),
        }
    }
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_MIME))
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonOrFormRejection;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&request) {
            let Form(value) = Form::<T>::from_request(request, state)
                .await
                .map_err(JsonOrFormRejection::Form)?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(request, state)
                .await
                .map_err(JsonOrFormRejection::Json)?;
            Ok(Self(value))
        }
    }
}
