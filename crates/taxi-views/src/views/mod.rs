//! Page handlers.
//!
//! Every handler except the login page runs behind
//! [`login_required`](taxi_auth::middleware::login_required), so the
//! [`CurrentUser`](taxi_auth::CurrentUser) extractor always succeeds.
//!
//! - [`index`] - Home page with record counts
//! - [`manufacturers`] - Manufacturer list and CRUD
//! - [`cars`] - Car list, detail, CRUD and the assignment toggle
//! - [`drivers`] - Driver list, detail, creation, license update, delete
//! - [`accounts`] - Login and logout

pub mod accounts;
pub mod cars;
pub mod drivers;
pub mod index;
pub mod manufacturers;

use axum::extract::OriginalUri;
use axum::response::Response;
use http::StatusCode;
use serde_json::{json, Value};

use taxi_db::Driver;

use crate::error::{error_page, ViewResult};
use crate::state::AppState;
use crate::templates::render;

/// Renders the shared form page.
pub(crate) fn form_page(
    state: &AppState,
    user: &Driver,
    title: &str,
    form: Value,
) -> ViewResult {
    render(
        state,
        "taxi/form.html",
        Some(user),
        json!({ "title": title, "form": form }),
    )
}

/// Renders the shared delete confirmation page.
pub(crate) fn confirm_delete_page(
    state: &AppState,
    user: &Driver,
    verbose_name: &str,
    object: &str,
    cancel_url: &str,
) -> ViewResult {
    render(
        state,
        "taxi/confirm_delete.html",
        Some(user),
        json!({
            "verbose_name": verbose_name,
            "object": object,
            "cancel_url": cancel_url,
        }),
    )
}

/// Fallback for unmatched paths.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!(path = %uri.path(), "no route");
    error_page(StatusCode::NOT_FOUND)
}
