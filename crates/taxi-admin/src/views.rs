//! Admin page handlers.

use std::sync::Arc;

use axum::extract::{Path, RawQuery, State};
use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tera::Tera;

use taxi_auth::middleware::{found, CurrentUser};
use taxi_core::{QueryDict, TaxiError, TaxiResult};
use taxi_db::SqliteBackend;

use crate::db::{AdminDbExecutor, SEARCH_VAR};
use crate::forms::AdminForm;
use crate::model_admin::{column_label, ModelAdmin};
use crate::site::AdminSite;
use crate::templates::render;

/// Shared state for the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub site: Arc<AdminSite>,
    pub db: SqliteBackend,
    pub executor: Arc<dyn AdminDbExecutor>,
    pub templates: Arc<Tera>,
}

impl std::fmt::Debug for AdminState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminState")
            .field("site", &self.site)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

/// A [`TaxiError`] rendered as an admin error page.
#[derive(Debug)]
pub struct AdminError(pub TaxiError);

impl From<TaxiError> for AdminError {
    fn from(err: TaxiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "admin request failed");
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html><html><head><title>{reason}</title></head><body><h1>{} {reason}</h1></body></html>",
            status.as_u16()
        );
        (status, Html(body)).into_response()
    }
}

type AdminResult = Result<Response, AdminError>;

fn model_admin<'a>(state: &'a AdminState, app: &str, model: &str) -> TaxiResult<&'a ModelAdmin> {
    state
        .site
        .get_model_admin(app, model)
        .ok_or_else(|| TaxiError::NotFound(format!("No admin registered for {app}.{model}")))
}

fn page(state: &AdminState, name: &str, user: &CurrentUser, mut context: Value) -> AdminResult {
    if let Some(obj) = context.as_object_mut() {
        obj.insert("site_header".to_string(), json!(state.site.header()));
        obj.insert("user".to_string(), json!(user.0.username));
    }
    Ok(Html(render(&state.templates, name, &context)?).into_response())
}

// ── Index ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ModelEntry<'a> {
    model_name: &'a str,
    verbose_name_plural: &'a str,
    changelist_url: String,
    add_url: String,
    count: i64,
}

/// `GET /admin/`
pub async fn index(State(state): State<AdminState>, user: CurrentUser) -> AdminResult {
    let mut models = Vec::new();
    for admin in state.site.model_admins() {
        models.push(ModelEntry {
            model_name: &admin.model_name,
            verbose_name_plural: &admin.verbose_name_plural,
            changelist_url: admin.changelist_url(),
            add_url: admin.add_url(),
            count: state.executor.count(admin).await?,
        });
    }
    let context = json!({ "app_label": "taxi", "models": models });
    page(&state, "admin/index.html", &user, context)
}

// ── Changelist ──────────────────────────────────────────────────────

/// `GET /admin/{app}/{model}/`
pub async fn changelist(
    State(state): State<AdminState>,
    Path((app, model)): Path<(String, String)>,
    RawQuery(query): RawQuery,
    user: CurrentUser,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let params = QueryDict::parse(query.as_deref().unwrap_or_default());

    let rows = state.executor.list_objects(admin, &params).await?;
    let filters = state.executor.filter_specs(admin, &params).await?;

    let columns: Vec<Value> = admin
        .list_display
        .iter()
        .map(|field| {
            let label = if field == "__str__" {
                admin.verbose_name.clone()
            } else {
                column_label(field)
            };
            json!({ "field": field, "label": label })
        })
        .collect();
    let rows: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "pk": row.pk,
                "change_url": admin.change_url(row.pk),
                "cells": row.columns(admin),
            })
        })
        .collect();

    let context = json!({
        "verbose_name": admin.verbose_name,
        "verbose_name_plural": admin.verbose_name_plural,
        "add_url": admin.add_url(),
        "search_fields": admin.search_fields,
        "search_term": params.get(SEARCH_VAR).unwrap_or_default(),
        "filters": filters,
        "columns": columns,
        "result_count": rows.len(),
        "rows": rows,
    });
    page(&state, "admin/change_list.html", &user, context)
}

// ── Add / change ────────────────────────────────────────────────────

fn form_page(
    state: &AdminState,
    user: &CurrentUser,
    admin: &ModelAdmin,
    form: &AdminForm,
    pk: Option<i64>,
    object_display: Option<String>,
) -> AdminResult {
    let verb = if pk.is_some() { "Change" } else { "Add" };
    let context = json!({
        "title": format!("{verb} {}", admin.verbose_name),
        "model_name": admin.model_name,
        "object_display": object_display,
        "delete_url": pk.map(|pk| admin.delete_url(pk)),
        "form": form.as_context(admin.form_fields(pk.is_none())),
    });
    page(state, "admin/change_form.html", user, context)
}

/// `GET /admin/{app}/{model}/add/`
pub async fn add_form(
    State(state): State<AdminState>,
    Path((app, model)): Path<(String, String)>,
    user: CurrentUser,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let form = AdminForm::for_add(state.db.clone(), admin).await?;
    form_page(&state, &user, admin, &form, None, None)
}

/// `POST /admin/{app}/{model}/add/`
pub async fn add_submit(
    State(state): State<AdminState>,
    Path((app, model)): Path<(String, String)>,
    user: CurrentUser,
    body: String,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let mut form = AdminForm::for_add(state.db.clone(), admin).await?;
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!(model = %admin.key(), "admin add form invalid");
        return form_page(&state, &user, admin, &form, None, None);
    }
    let pk = form.save().await?;
    tracing::info!(model = %admin.key(), pk, by = %user.0.username, "admin added object");
    Ok(found(&admin.changelist_url()))
}

/// `GET /admin/{app}/{model}/{pk}/change/`
pub async fn change_form(
    State(state): State<AdminState>,
    Path((app, model, pk)): Path<(String, String, i64)>,
    user: CurrentUser,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let object = state.executor.get_object(admin, pk).await?;
    let form = AdminForm::for_change(state.db.clone(), admin, pk).await?;
    form_page(&state, &user, admin, &form, Some(pk), Some(object.display))
}

/// `POST /admin/{app}/{model}/{pk}/change/`
pub async fn change_submit(
    State(state): State<AdminState>,
    Path((app, model, pk)): Path<(String, String, i64)>,
    user: CurrentUser,
    body: String,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let object = state.executor.get_object(admin, pk).await?;
    let mut form = AdminForm::for_change(state.db.clone(), admin, pk).await?;
    form.bind(&QueryDict::parse(&body));
    if !form.validate().await? {
        tracing::debug!(model = %admin.key(), pk, "admin change form invalid");
        return form_page(&state, &user, admin, &form, Some(pk), Some(object.display));
    }
    form.save().await?;
    tracing::info!(model = %admin.key(), pk, by = %user.0.username, "admin changed object");
    Ok(found(&admin.changelist_url()))
}

// ── Delete ──────────────────────────────────────────────────────────

/// `GET /admin/{app}/{model}/{pk}/delete/`
pub async fn delete_confirm(
    State(state): State<AdminState>,
    Path((app, model, pk)): Path<(String, String, i64)>,
    user: CurrentUser,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    let object = state.executor.get_object(admin, pk).await?;
    let context = json!({
        "verbose_name": admin.verbose_name,
        "object_display": object.display,
        "change_url": admin.change_url(pk),
    });
    page(&state, "admin/delete_confirmation.html", &user, context)
}

/// `POST /admin/{app}/{model}/{pk}/delete/`
pub async fn delete_submit(
    State(state): State<AdminState>,
    Path((app, model, pk)): Path<(String, String, i64)>,
    user: CurrentUser,
) -> AdminResult {
    let admin = model_admin(&state, &app, &model)?;
    state.executor.get_object(admin, pk).await?;
    state.executor.delete_object(admin, pk).await?;
    tracing::info!(model = %admin.key(), pk, by = %user.0.username, "admin deleted object");
    Ok(found(&admin.changelist_url()))
}
