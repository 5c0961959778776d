//! Manufacturer pages.

use axum::extract::{Path, RawQuery, State};
use serde_json::json;

use taxi_auth::middleware::found;
use taxi_auth::CurrentUser;
use taxi_core::QueryDict;
use taxi_db::manufacturers::{self, ManufacturerFilter};
use taxi_forms::fleet::ManufacturerForm;
use taxi_forms::search::SearchForm;
use taxi_forms::Form;

use crate::error::ViewResult;
use crate::state::AppState;
use crate::templates::render;
use crate::views::{confirm_delete_page, form_page};

const LIST_URL: &str = "/manufacturers/";

/// `GET /manufacturers/?name=`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RawQuery(query): RawQuery,
) -> ViewResult {
    let query = QueryDict::parse(query.as_deref().unwrap_or_default());
    let mut search_form = SearchForm::manufacturer();
    let filter = ManufacturerFilter {
        name: search_form.search_term(&query).await,
    };
    let manufacturer_list = manufacturers::list(&state.db, &filter).await?;
    render(
        &state,
        "taxi/manufacturer_list.html",
        Some(&user),
        json!({
            "manufacturer_list": manufacturer_list,
            "search_form": search_form.as_context(),
        }),
    )
}

/// `GET /manufacturers/create/`
pub async fn create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ViewResult {
    let form = ManufacturerForm::new(state.db.clone(), None);
    form_page(&state, &user, "Create manufacturer", form.as_context())
}

/// `POST /manufacturers/create/`
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: String,
) -> ViewResult {
    let mut form = ManufacturerForm::new(state.db.clone(), None);
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!("manufacturer form invalid");
        return form_page(&state, &user, "Create manufacturer", form.as_context());
    }
    let manufacturer = form.save().await?;
    tracing::info!(id = manufacturer.id, by = %user.username, "manufacturer created");
    Ok(found(LIST_URL))
}

/// `GET /manufacturers/{pk}/update/`
pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let manufacturer = manufacturers::get(&state.db, pk).await?;
    let form = ManufacturerForm::new(state.db.clone(), Some(&manufacturer));
    form_page(&state, &user, "Update manufacturer", form.as_context())
}

/// `POST /manufacturers/{pk}/update/`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
    body: String,
) -> ViewResult {
    let manufacturer = manufacturers::get(&state.db, pk).await?;
    let mut form = ManufacturerForm::new(state.db.clone(), Some(&manufacturer));
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!(id = pk, "manufacturer form invalid");
        return form_page(&state, &user, "Update manufacturer", form.as_context());
    }
    form.save().await?;
    tracing::info!(id = pk, by = %user.username, "manufacturer updated");
    Ok(found(LIST_URL))
}

/// `GET /manufacturers/{pk}/delete/`
pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let manufacturer = manufacturers::get(&state.db, pk).await?;
    confirm_delete_page(
        &state,
        &user,
        "manufacturer",
        &manufacturer.to_string(),
        LIST_URL,
    )
}

/// `POST /manufacturers/{pk}/delete/`
///
/// The manufacturer's cars go with it.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    manufacturers::get(&state.db, pk).await?;
    manufacturers::delete(&state.db, pk).await?;
    tracing::info!(id = pk, by = %user.username, "manufacturer deleted");
    Ok(found(LIST_URL))
}
