//! Manufacturer and car forms.
//!
//! Both serve create and update: pass the existing record to edit it.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use taxi_core::{QueryDict, TaxiResult};
use taxi_db::cars::{self, CarData};
use taxi_db::drivers::{self, DriverFilter};
use taxi_db::manufacturers::{self, ManufacturerData, ManufacturerFilter};
use taxi_db::{Car, Manufacturer, SqliteBackend};

use crate::fields::{FormFieldDef, FormFieldType};
use crate::form::{settle, BaseForm, Form};
use crate::widgets::WidgetType;

pub const DUPLICATE_MANUFACTURER: &str = "Manufacturer with this Name already exists.";

// ── ManufacturerForm ────────────────────────────────────────────────

#[derive(Debug)]
pub struct ManufacturerForm {
    inner: BaseForm,
    db: SqliteBackend,
    instance: Option<i64>,
}

impl ManufacturerForm {
    pub fn new(db: SqliteBackend, instance: Option<&Manufacturer>) -> Self {
        let mut inner = BaseForm::new(vec![
            FormFieldDef::new("name", FormFieldType::char(255)),
            FormFieldDef::new("country", FormFieldType::char(255)),
        ]);
        if let Some(m) = instance {
            inner = inner
                .with_initial("name", m.name.clone())
                .with_initial("country", m.country.clone());
        }
        Self {
            inner,
            db,
            instance: instance.map(|m| m.id),
        }
    }

    pub async fn validate(&mut self) -> TaxiResult<bool> {
        if !self.inner.is_bound() {
            return Ok(false);
        }
        self.inner.is_valid().await;
        if let Some(name) = self.inner.cleaned_str("name").map(String::from) {
            if manufacturers::name_exists(&self.db, &name, self.instance).await? {
                self.inner.add_error("name", DUPLICATE_MANUFACTURER);
            }
        }
        Ok(self.inner.errors().is_empty())
    }

    /// Inserts or updates the manufacturer.
    pub async fn save(&self) -> TaxiResult<Manufacturer> {
        let data = ManufacturerData {
            name: self.inner.cleaned_str("name").unwrap_or_default().to_string(),
            country: self.inner.cleaned_str("country").unwrap_or_default().to_string(),
        };
        match self.instance {
            Some(id) => manufacturers::update(&self.db, id, &data).await,
            None => manufacturers::create(&self.db, &data).await,
        }
    }
}

#[async_trait]
impl Form for ManufacturerForm {
    fn fields(&self) -> &[FormFieldDef] {
        self.inner.fields()
    }

    fn bind(&mut self, data: &QueryDict) {
        self.inner.bind(data);
    }

    fn is_bound(&self) -> bool {
        self.inner.is_bound()
    }

    async fn is_valid(&mut self) -> bool {
        let result = self.validate().await;
        settle(&mut self.inner, result)
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        self.inner.errors()
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        self.inner.cleaned_data()
    }

    fn as_context(&self) -> Value {
        self.inner.as_context()
    }
}

// ── CarForm ─────────────────────────────────────────────────────────

/// A car's model, manufacturer and assigned drivers.
///
/// The `drivers` field renders as a checkbox list and may be left empty.
#[derive(Debug)]
pub struct CarForm {
    inner: BaseForm,
    db: SqliteBackend,
    instance: Option<i64>,
}

impl CarForm {
    /// Builds the form, loading manufacturer and driver choices.
    pub async fn load(db: SqliteBackend, instance: Option<&Car>) -> TaxiResult<Self> {
        let manufacturer_choices = manufacturers::list(&db, &ManufacturerFilter::default())
            .await?
            .into_iter()
            .map(|m| (m.id.to_string(), m.to_string()))
            .collect();
        let driver_choices = drivers::list(&db, &DriverFilter::default())
            .await?
            .into_iter()
            .map(|d| (d.id.to_string(), d.to_string()))
            .collect();

        let mut inner = BaseForm::new(vec![
            FormFieldDef::new("model", FormFieldType::char(255)),
            FormFieldDef::new(
                "manufacturer",
                FormFieldType::Choice {
                    choices: manufacturer_choices,
                },
            ),
            FormFieldDef::new(
                "drivers",
                FormFieldType::MultipleChoice {
                    choices: driver_choices,
                },
            )
            .required(false)
            .widget(WidgetType::CheckboxSelectMultiple),
        ]);

        if let Some(car) = instance {
            let assigned = cars::driver_ids(&db, car.id)
                .await?
                .into_iter()
                .map(|id| id.to_string())
                .collect();
            inner = inner
                .with_initial("model", car.model.clone())
                .with_initial("manufacturer", car.manufacturer_id().to_string())
                .with_initial_list("drivers", assigned);
        }

        Ok(Self {
            inner,
            db,
            instance: instance.map(|c| c.id),
        })
    }

    pub async fn validate(&mut self) -> TaxiResult<bool> {
        Ok(self.inner.is_bound() && self.inner.is_valid().await)
    }

    fn data(&self) -> CarData {
        // Choice validation guarantees these parse.
        let manufacturer_id = self
            .inner
            .cleaned_str("manufacturer")
            .and_then(|id| id.parse().ok())
            .unwrap_or_default();
        let driver_ids = self
            .inner
            .cleaned_list("drivers")
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect();
        CarData {
            model: self.inner.cleaned_str("model").unwrap_or_default().to_string(),
            manufacturer_id,
            driver_ids,
        }
    }

    /// Inserts or updates the car and replaces its driver set.
    pub async fn save(&self) -> TaxiResult<Car> {
        let data = self.data();
        match self.instance {
            Some(id) => cars::update(&self.db, id, &data).await,
            None => cars::create(&self.db, &data).await,
        }
    }
}

#[async_trait]
impl Form for CarForm {
    fn fields(&self) -> &[FormFieldDef] {
        self.inner.fields()
    }

    fn bind(&mut self, data: &QueryDict) {
        self.inner.bind(data);
    }

    fn is_bound(&self) -> bool {
        self.inner.is_bound()
    }

    async fn is_valid(&mut self) -> bool {
        let result = self.validate().await;
        settle(&mut self.inner, result)
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        self.inner.errors()
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        self.inner.cleaned_data()
    }

    fn as_context(&self) -> Value {
        self.inner.as_context()
    }
}
