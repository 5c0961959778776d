//! Driver pages.

use axum::extract::{Path, RawQuery, State};
use serde_json::json;

use taxi_auth::middleware::found;
use taxi_auth::CurrentUser;
use taxi_core::QueryDict;
use taxi_db::cars;
use taxi_db::drivers::{self, DriverFilter};
use taxi_forms::driver::{DriverCreationForm, DriverLicenseUpdateForm};
use taxi_forms::search::SearchForm;
use taxi_forms::Form;

use crate::error::ViewResult;
use crate::state::AppState;
use crate::templates::render;
use crate::views::{confirm_delete_page, form_page};

const LIST_URL: &str = "/drivers/";

/// `GET /drivers/?username=`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RawQuery(query): RawQuery,
) -> ViewResult {
    let query = QueryDict::parse(query.as_deref().unwrap_or_default());
    let mut search_form = SearchForm::driver();
    let filter = DriverFilter {
        username: search_form.search_term(&query).await,
        ..DriverFilter::default()
    };
    let driver_list = drivers::list(&state.db, &filter).await?;
    render(
        &state,
        "taxi/driver_list.html",
        Some(&user),
        json!({
            "driver_list": driver_list,
            "search_form": search_form.as_context(),
        }),
    )
}

/// `GET /drivers/{pk}/`
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let driver = drivers::get(&state.db, pk).await?;
    let assigned = cars::for_driver(&state.db, pk).await?;
    render(
        &state,
        "taxi/driver_detail.html",
        Some(&user),
        json!({ "driver": driver, "cars": assigned }),
    )
}

/// `GET /drivers/create/`
pub async fn create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ViewResult {
    let form = DriverCreationForm::new(state.db.clone());
    form_page(&state, &user, "Create driver", form.as_context())
}

/// `POST /drivers/create/`
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: String,
) -> ViewResult {
    let mut form = DriverCreationForm::new(state.db.clone());
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!("driver creation form invalid");
        return form_page(&state, &user, "Create driver", form.as_context());
    }
    let driver = form.save().await?;
    tracing::info!(id = driver.id, username = %driver.username, by = %user.username, "driver created");
    Ok(found(&driver.get_absolute_url()))
}

/// `GET /drivers/{pk}/update/`
pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let driver = drivers::get(&state.db, pk).await?;
    let form = DriverLicenseUpdateForm::new(state.db.clone(), &driver);
    form_page(&state, &user, "Update license number", form.as_context())
}

/// `POST /drivers/{pk}/update/`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
    body: String,
) -> ViewResult {
    let driver = drivers::get(&state.db, pk).await?;
    let mut form = DriverLicenseUpdateForm::new(state.db.clone(), &driver);
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!(id = pk, "license update form invalid");
        return form_page(&state, &user, "Update license number", form.as_context());
    }
    form.save().await?;
    tracing::info!(id = pk, by = %user.username, "driver license updated");
    Ok(found(LIST_URL))
}

/// `GET /drivers/{pk}/delete/`
pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let driver = drivers::get(&state.db, pk).await?;
    confirm_delete_page(
        &state,
        &user,
        "driver",
        &driver.to_string(),
        &driver.get_absolute_url(),
    )
}

/// `POST /drivers/{pk}/delete/`
///
/// Deleting yourself ends your session on the next request.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    drivers::get(&state.db, pk).await?;
    drivers::delete(&state.db, pk).await?;
    tracing::info!(id = pk, by = %user.username, "driver deleted");
    Ok(found(LIST_URL))
}
