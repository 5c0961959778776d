//! Car pages and the driver assignment toggle.

use axum::extract::{Path, RawQuery, State};
use serde_json::json;

use taxi_auth::middleware::found;
use taxi_auth::CurrentUser;
use taxi_core::QueryDict;
use taxi_db::cars::{self, CarFilter};
use taxi_forms::fleet::CarForm;
use taxi_forms::search::SearchForm;
use taxi_forms::Form;

use crate::error::ViewResult;
use crate::state::AppState;
use crate::templates::render;
use crate::views::{confirm_delete_page, form_page};

const LIST_URL: &str = "/cars/";

fn detail_url(pk: i64) -> String {
    format!("/cars/{pk}/")
}

/// `GET /cars/?model=`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RawQuery(query): RawQuery,
) -> ViewResult {
    let query = QueryDict::parse(query.as_deref().unwrap_or_default());
    let mut search_form = SearchForm::car();
    let filter = CarFilter {
        model: search_form.search_term(&query).await,
        manufacturer_id: None,
    };
    let car_list = cars::list(&state.db, &filter).await?;
    render(
        &state,
        "taxi/car_list.html",
        Some(&user),
        json!({
            "car_list": car_list,
            "search_form": search_form.as_context(),
        }),
    )
}

/// `GET /cars/{pk}/`
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let car = cars::get(&state.db, pk).await?;
    let drivers = cars::drivers(&state.db, pk).await?;
    let is_assigned = drivers.iter().any(|d| d.id == user.id);
    render(
        &state,
        "taxi/car_detail.html",
        Some(&user),
        json!({
            "car": car,
            "drivers": drivers,
            "is_assigned": is_assigned,
        }),
    )
}

/// `GET /cars/create/`
pub async fn create_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ViewResult {
    let form = CarForm::load(state.db.clone(), None).await?;
    form_page(&state, &user, "Create car", form.as_context())
}

/// `POST /cars/create/`
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: String,
) -> ViewResult {
    let mut form = CarForm::load(state.db.clone(), None).await?;
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!("car form invalid");
        return form_page(&state, &user, "Create car", form.as_context());
    }
    let car = form.save().await?;
    tracing::info!(id = car.id, by = %user.username, "car created");
    Ok(found(LIST_URL))
}

/// `GET /cars/{pk}/update/`
pub async fn update_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let car = cars::get(&state.db, pk).await?;
    let form = CarForm::load(state.db.clone(), Some(&car)).await?;
    form_page(&state, &user, "Update car", form.as_context())
}

/// `POST /cars/{pk}/update/`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
    body: String,
) -> ViewResult {
    let car = cars::get(&state.db, pk).await?;
    let mut form = CarForm::load(state.db.clone(), Some(&car)).await?;
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!(id = pk, "car form invalid");
        return form_page(&state, &user, "Update car", form.as_context());
    }
    form.save().await?;
    tracing::info!(id = pk, by = %user.username, "car updated");
    Ok(found(LIST_URL))
}

/// `GET /cars/{pk}/delete/`
pub async fn delete_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    let car = cars::get(&state.db, pk).await?;
    confirm_delete_page(&state, &user, "car", &car.to_string(), &detail_url(pk))
}

/// `POST /cars/{pk}/delete/`
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    cars::get(&state.db, pk).await?;
    cars::delete(&state.db, pk).await?;
    tracing::info!(id = pk, by = %user.username, "car deleted");
    Ok(found(LIST_URL))
}

/// `POST /cars/{pk}/toggle-assign/`
///
/// Adds the current driver to the car, or removes them if already
/// assigned, then returns to the car's page. Repeated submissions keep
/// flipping the assignment.
pub async fn toggle_assign(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<i64>,
) -> ViewResult {
    cars::get(&state.db, pk).await?;
    let assigned = cars::toggle_driver(&state.db, pk, user.id).await?;
    tracing::info!(car = pk, driver = user.id, assigned, "car assignment toggled");
    Ok(found(&detail_url(pk)))
}
