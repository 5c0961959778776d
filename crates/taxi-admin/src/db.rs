//! Admin database integration.
//!
//! The admin pages are generic over the registered models, so they see
//! objects as `serde_json::Value` rows. [`AdminDbExecutor`] bridges those
//! rows and the typed repositories in `taxi-db`; [`SqliteAdminDb`] is the
//! implementation over the service's database.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use taxi_core::{QueryDict, TaxiError, TaxiResult};
use taxi_db::cars::{self, CarFilter};
use taxi_db::drivers::{self, DriverFilter};
use taxi_db::lookups::non_empty;
use taxi_db::manufacturers::{self, ManufacturerFilter};
use taxi_db::{Car, Driver, Manufacturer, SqliteBackend};

use crate::filters::{parse_flag, FilterSpec};
use crate::model_admin::ModelAdmin;

/// Query parameter carrying the changelist search term.
pub const SEARCH_VAR: &str = "q";

/// One object as the admin sees it.
#[derive(Debug, Clone, Serialize)]
pub struct AdminRow {
    pub pk: i64,
    /// The object's display string.
    pub display: String,
    /// Field values keyed by field name.
    pub object: Value,
}

impl AdminRow {
    /// The cell values for the changelist's `list_display` columns.
    pub fn columns(&self, admin: &ModelAdmin) -> Vec<String> {
        admin
            .list_display
            .iter()
            .map(|field| {
                if field == "__str__" {
                    self.display.clone()
                } else {
                    display_value(self.object.get(field).unwrap_or(&Value::Null))
                }
            })
            .collect()
    }
}

/// Formats a field value for a changelist cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Admin CRUD over registered models.
///
/// An unregistered model name gives [`TaxiError::NotFound`].
#[async_trait]
pub trait AdminDbExecutor: Send + Sync {
    /// Lists objects, applying the `?q=` search over `search_fields` and any
    /// `list_filter` parameters present in `params`.
    async fn list_objects(&self, admin: &ModelAdmin, params: &QueryDict) -> TaxiResult<Vec<AdminRow>>;

    /// Resolves the sidebar filters for the changelist.
    async fn filter_specs(&self, admin: &ModelAdmin, params: &QueryDict) -> TaxiResult<Vec<FilterSpec>>;

    async fn get_object(&self, admin: &ModelAdmin, pk: i64) -> TaxiResult<AdminRow>;

    async fn delete_object(&self, admin: &ModelAdmin, pk: i64) -> TaxiResult<()>;

    async fn count(&self, admin: &ModelAdmin) -> TaxiResult<i64>;
}

/// [`AdminDbExecutor`] over the service's SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteAdminDb {
    db: SqliteBackend,
}

impl SqliteAdminDb {
    pub const fn new(db: SqliteBackend) -> Self {
        Self { db }
    }
}

fn unknown_model(admin: &ModelAdmin) -> TaxiError {
    TaxiError::NotFound(format!("No admin for model '{}'", admin.key()))
}

fn manufacturer_row(m: &Manufacturer) -> AdminRow {
    AdminRow {
        pk: m.id,
        display: m.to_string(),
        object: json!({ "id": m.id, "name": m.name, "country": m.country }),
    }
}

fn car_row(car: &Car) -> AdminRow {
    AdminRow {
        pk: car.id,
        display: car.to_string(),
        object: json!({
            "id": car.id,
            "model": car.model,
            "manufacturer": car.manufacturer.to_string(),
            "manufacturer_id": car.manufacturer_id(),
        }),
    }
}

fn driver_row(driver: &Driver) -> TaxiResult<AdminRow> {
    let object = serde_json::to_value(driver)
        .map_err(|e| TaxiError::SerializationError(e.to_string()))?;
    Ok(AdminRow {
        pk: driver.id,
        display: driver.to_string(),
        object,
    })
}

/// The value of a `list_filter` parameter, if the field is a registered
/// filter and the parameter is non-empty.
fn filter_param<'a>(admin: &ModelAdmin, params: &'a QueryDict, field: &str) -> Option<&'a str> {
    if !admin.list_filter.iter().any(|f| f == field) {
        return None;
    }
    non_empty(params.get(field))
}

fn search_term(admin: &ModelAdmin, params: &QueryDict) -> Option<String> {
    if !admin.has_search() {
        return None;
    }
    non_empty(params.get(SEARCH_VAR).map(str::trim)).map(String::from)
}

#[async_trait]
impl AdminDbExecutor for SqliteAdminDb {
    async fn list_objects(&self, admin: &ModelAdmin, params: &QueryDict) -> TaxiResult<Vec<AdminRow>> {
        let term = search_term(admin, params);
        match admin.model_name.as_str() {
            "manufacturer" => {
                let filter = ManufacturerFilter { name: term };
                let rows = manufacturers::list(&self.db, &filter).await?;
                Ok(rows.iter().map(manufacturer_row).collect())
            }
            "car" => {
                let filter = CarFilter {
                    model: term,
                    manufacturer_id: filter_param(admin, params, "manufacturer")
                        .and_then(|id| id.parse().ok()),
                };
                let rows = cars::list(&self.db, &filter).await?;
                Ok(rows.iter().map(car_row).collect())
            }
            "driver" => {
                let flag = |field: &str| parse_flag(filter_param(admin, params, field));
                let filter = DriverFilter {
                    search: term,
                    is_staff: flag("is_staff"),
                    is_superuser: flag("is_superuser"),
                    is_active: flag("is_active"),
                    ..DriverFilter::default()
                };
                let rows = drivers::list(&self.db, &filter).await?;
                rows.iter().map(driver_row).collect()
            }
            _ => Err(unknown_model(admin)),
        }
    }

    async fn filter_specs(&self, admin: &ModelAdmin, params: &QueryDict) -> TaxiResult<Vec<FilterSpec>> {
        let mut specs = Vec::with_capacity(admin.list_filter.len());
        for field in &admin.list_filter {
            let spec = match field.as_str() {
                "manufacturer" => {
                    let choices = manufacturers::list(&self.db, &ManufacturerFilter::default())
                        .await?
                        .into_iter()
                        .map(|m| (m.to_string(), m.id.to_string()))
                        .collect();
                    FilterSpec::new(field, choices, params)
                }
                "is_staff" | "is_superuser" | "is_active" => FilterSpec::boolean(field, params),
                other => {
                    tracing::warn!(model = %admin.key(), filter = other, "unsupported list filter");
                    continue;
                }
            };
            specs.push(spec);
        }
        Ok(specs)
    }

    async fn get_object(&self, admin: &ModelAdmin, pk: i64) -> TaxiResult<AdminRow> {
        match admin.model_name.as_str() {
            "manufacturer" => Ok(manufacturer_row(&manufacturers::get(&self.db, pk).await?)),
            "car" => Ok(car_row(&cars::get(&self.db, pk).await?)),
            "driver" => driver_row(&drivers::get(&self.db, pk).await?),
            _ => Err(unknown_model(admin)),
        }
    }

    async fn delete_object(&self, admin: &ModelAdmin, pk: i64) -> TaxiResult<()> {
        match admin.model_name.as_str() {
            "manufacturer" => manufacturers::delete(&self.db, pk).await,
            "car" => cars::delete(&self.db, pk).await,
            "driver" => drivers::delete(&self.db, pk).await,
            _ => Err(unknown_model(admin)),
        }
    }

    async fn count(&self, admin: &ModelAdmin) -> TaxiResult<i64> {
        match admin.model_name.as_str() {
            "manufacturer" => manufacturers::count(&self.db).await,
            "car" => cars::count(&self.db).await,
            "driver" => drivers::count(&self.db).await,
            _ => Err(unknown_model(admin)),
        }
    }
}
