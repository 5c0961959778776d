//! Admin site registry and router generation.
//!
//! The [`AdminSite`] holds every registered [`ModelAdmin`] and produces the
//! axum router serving the admin pages under `/admin/`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use taxi_auth::middleware::{found, staff_required, AuthState};
use taxi_core::TaxiResult;
use taxi_db::SqliteBackend;

use crate::db::{AdminDbExecutor, SqliteAdminDb};
use crate::model_admin::ModelAdmin;
use crate::templates::admin_templates;
use crate::views::{self, AdminState};

/// The admin site: model registrations plus the page header.
///
/// # Examples
///
/// ```
/// use taxi_admin::model_admin::ModelAdmin;
/// use taxi_admin::site::AdminSite;
///
/// let mut site = AdminSite::new("admin");
/// site.register(ModelAdmin::new("taxi", "manufacturer"));
/// assert!(site.is_registered("taxi.manufacturer"));
/// ```
#[derive(Debug, Clone)]
pub struct AdminSite {
    name: String,
    site_header: String,
    /// Keyed by `"app.model"`, which also orders the index page.
    registered_models: BTreeMap<String, ModelAdmin>,
}

impl AdminSite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            site_header: "Taxi administration".to_string(),
            registered_models: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn site_header(mut self, header: &str) -> Self {
        self.site_header = header.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &str {
        &self.site_header
    }

    /// Registers a model, replacing any earlier registration.
    pub fn register(&mut self, admin: ModelAdmin) {
        tracing::debug!(model = %admin.key(), "registered admin");
        self.registered_models.insert(admin.key(), admin);
    }

    pub fn unregister(&mut self, model_key: &str) {
        self.registered_models.remove(model_key);
    }

    pub fn get_model_admin(&self, app_label: &str, model_name: &str) -> Option<&ModelAdmin> {
        self.registered_models
            .get(&format!("{app_label}.{model_name}"))
    }

    /// Registered models in index order.
    pub fn model_admins(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registered_models.values()
    }

    pub fn registered_models(&self) -> Vec<&str> {
        self.registered_models.keys().map(String::as_str).collect()
    }

    pub fn model_count(&self) -> usize {
        self.registered_models.len()
    }

    pub fn is_registered(&self, model_key: &str) -> bool {
        self.registered_models.contains_key(model_key)
    }

    /// Builds the admin router over the service database.
    ///
    /// Every route sits behind [`staff_required`], so the router must be
    /// served inside the session middleware.
    ///
    /// - `GET /admin/` - Index of registered models
    /// - `GET /admin/{app}/{model}/` - Changelist with `?q=` and filters
    /// - `GET|POST /admin/{app}/{model}/add/` - Add form
    /// - `GET|POST /admin/{app}/{model}/{pk}/change/` - Change form
    /// - `GET|POST /admin/{app}/{model}/{pk}/delete/` - Delete confirmation
    pub fn into_router(self, db: SqliteBackend, auth: AuthState) -> TaxiResult<Router> {
        let executor: Arc<dyn AdminDbExecutor> = Arc::new(SqliteAdminDb::new(db.clone()));
        self.into_router_with(db, executor, auth)
    }

    /// Like [`AdminSite::into_router`] with a custom executor.
    pub fn into_router_with(
        self,
        db: SqliteBackend,
        executor: Arc<dyn AdminDbExecutor>,
        auth: AuthState,
    ) -> TaxiResult<Router> {
        let state = AdminState {
            site: Arc::new(self),
            db,
            executor,
            templates: Arc::new(admin_templates()?),
        };

        Ok(Router::new()
            .route("/admin", get(|| async { found("/admin/") }))
            .route("/admin/", get(views::index))
            .route("/admin/{app}/{model}/", get(views::changelist))
            .route(
                "/admin/{app}/{model}/add/",
                get(views::add_form).post(views::add_submit),
            )
            .route(
                "/admin/{app}/{model}/{pk}/change/",
                get(views::change_form).post(views::change_submit),
            )
            .route(
                "/admin/{app}/{model}/{pk}/delete/",
                get(views::delete_confirm).post(views::delete_submit),
            )
            .route_layer(from_fn_with_state(auth, staff_required))
            .with_state(state))
    }
}
