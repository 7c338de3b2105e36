//! Public page route handlers.
//!
//! Static content pages. The only dynamic bit is the nav, which links to the
//! admin panel for a signed-in admin.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAdmin;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub signed_in: bool,
}

/// Gallery page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/gallery.html")]
pub struct GalleryTemplate {
    pub signed_in: bool,
}

/// Contribution form page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contribute.html")]
pub struct ContributeTemplate {
    pub signed_in: bool,
}

/// Songs page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/songs.html")]
pub struct SongsTemplate {
    pub signed_in: bool,
}

/// Updates page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/updates.html")]
pub struct UpdatesTemplate {
    pub signed_in: bool,
}

/// Display the home page.
pub async fn home(OptionalAdmin(admin): OptionalAdmin) -> impl IntoResponse {
    HomeTemplate {
        signed_in: admin.is_some(),
    }
}

/// Display the gallery.
pub async fn gallery(OptionalAdmin(admin): OptionalAdmin) -> impl IntoResponse {
    GalleryTemplate {
        signed_in: admin.is_some(),
    }
}

/// Display the contribution form.
pub async fn contribute(OptionalAdmin(admin): OptionalAdmin) -> impl IntoResponse {
    ContributeTemplate {
        signed_in: admin.is_some(),
    }
}

/// Display the songs page.
pub async fn songs(OptionalAdmin(admin): OptionalAdmin) -> impl IntoResponse {
    SongsTemplate {
        signed_in: admin.is_some(),
    }
}

/// Display the updates page.
pub async fn updates(OptionalAdmin(admin): OptionalAdmin) -> impl IntoResponse {
    UpdatesTemplate {
        signed_in: admin.is_some(),
    }
}
