//! The add and change forms behind each registered model.

use serde_json::Value;

use taxi_core::{QueryDict, TaxiError, TaxiResult};
use taxi_db::{cars, drivers, manufacturers, SqliteBackend};
use taxi_forms::driver::{DriverChangeForm, DriverCreationForm};
use taxi_forms::fleet::{CarForm, ManufacturerForm};
use taxi_forms::Form;

use crate::model_admin::ModelAdmin;

/// A model's admin form.
#[derive(Debug)]
pub enum AdminForm {
    Manufacturer(ManufacturerForm),
    Car(CarForm),
    DriverAdd(DriverCreationForm),
    DriverChange(DriverChangeForm),
}

impl AdminForm {
    /// The empty add form for `admin`'s model.
    pub async fn for_add(db: SqliteBackend, admin: &ModelAdmin) -> TaxiResult<Self> {
        match admin.model_name.as_str() {
            "manufacturer" => Ok(Self::Manufacturer(ManufacturerForm::new(db, None))),
            "car" => Ok(Self::Car(CarForm::load(db, None).await?)),
            "driver" => Ok(Self::DriverAdd(DriverCreationForm::new(db))),
            other => Err(TaxiError::NotFound(format!("No admin form for '{other}'"))),
        }
    }

    /// The change form for object `pk`, pre-filled with its values.
    pub async fn for_change(db: SqliteBackend, admin: &ModelAdmin, pk: i64) -> TaxiResult<Self> {
        match admin.model_name.as_str() {
            "manufacturer" => {
                let m = manufacturers::get(&db, pk).await?;
                Ok(Self::Manufacturer(ManufacturerForm::new(db, Some(&m))))
            }
            "car" => {
                let car = cars::get(&db, pk).await?;
                Ok(Self::Car(CarForm::load(db, Some(&car)).await?))
            }
            "driver" => {
                let driver = drivers::get(&db, pk).await?;
                Ok(Self::DriverChange(DriverChangeForm::new(db, &driver)))
            }
            other => Err(TaxiError::NotFound(format!("No admin form for '{other}'"))),
        }
    }

    fn form(&self) -> &dyn Form {
        match self {
            Self::Manufacturer(f) => f,
            Self::Car(f) => f,
            Self::DriverAdd(f) => f,
            Self::DriverChange(f) => f,
        }
    }

    fn form_mut(&mut self) -> &mut dyn Form {
        match self {
            Self::Manufacturer(f) => f,
            Self::Car(f) => f,
            Self::DriverAdd(f) => f,
            Self::DriverChange(f) => f,
        }
    }

    pub fn bind(&mut self, data: &QueryDict) {
        self.form_mut().bind(data);
    }

    /// Validates the bound form. Storage failures propagate.
    pub async fn validate(&mut self) -> TaxiResult<bool> {
        match self {
            Self::Manufacturer(f) => f.validate().await,
            Self::Car(f) => f.validate().await,
            Self::DriverAdd(f) => f.validate().await,
            Self::DriverChange(f) => f.validate().await,
        }
    }

    /// Saves a validated form, returning the object's primary key.
    pub async fn save(&self) -> TaxiResult<i64> {
        match self {
            Self::Manufacturer(f) => Ok(f.save().await?.id),
            Self::Car(f) => Ok(f.save().await?.id),
            Self::DriverAdd(f) => Ok(f.save().await?.id),
            Self::DriverChange(f) => Ok(f.save().await?.id),
        }
    }

    /// The form's template context with `fields` narrowed to `names`, in
    /// that order. An empty `names` keeps every field.
    pub fn as_context(&self, names: &[String]) -> Value {
        let mut ctx = self.form().as_context();
        if names.is_empty() {
            return ctx;
        }
        let selected: Vec<Value> = names
            .iter()
            .filter_map(|name| ctx.get(name.as_str()).cloned())
            .collect();
        if let Some(obj) = ctx.as_object_mut() {
            obj.insert("fields".to_string(), Value::Array(selected));
        }
        ctx
    }
}
