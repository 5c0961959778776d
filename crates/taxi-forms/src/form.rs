//! The [`Form`] trait and [`BaseForm`].
//!
//! `is_valid()` is async because form-level validation (uniqueness of a
//! username, a license number or a manufacturer name) needs the database.
//! Concrete forms wrap a [`BaseForm`] and add their own checks after the
//! field-level pass.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use taxi_core::{QueryDict, TaxiResult};

use crate::bound_field::BoundField;
use crate::fields::{clean_field_value, FormFieldDef, FormFieldType};

/// Key under which form-wide errors are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Behaviour shared by every form.
#[async_trait]
pub trait Form: Send + Sync {
    fn fields(&self) -> &[FormFieldDef];

    /// Binds submitted data, discarding earlier results.
    fn bind(&mut self, data: &QueryDict);

    fn is_bound(&self) -> bool;

    /// Validates the bound data. Unbound forms are never valid.
    async fn is_valid(&mut self) -> bool;

    /// Field errors keyed by field name, plus `__all__`.
    fn errors(&self) -> &HashMap<String, Vec<String>>;

    /// Cleaned values of the fields that passed validation.
    fn cleaned_data(&self) -> &HashMap<String, Value>;

    /// The template context for rendering the form.
    fn as_context(&self) -> Value;
}

/// Turns a storage failure during a form's database checks into a
/// form-wide error.
pub(crate) fn settle(form: &mut BaseForm, result: TaxiResult<bool>) -> bool {
    match result {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!(error = %e, "form validation failed");
            form.add_error(
                NON_FIELD_ERRORS,
                "Could not validate the form. Please try again.",
            );
            false
        }
    }
}

/// A general-purpose form built from a list of field definitions.
#[derive(Debug)]
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial: HashMap<String, Vec<String>>,
    bound: bool,
    raw_data: HashMap<String, Vec<String>>,
    errors: HashMap<String, Vec<String>>,
    cleaned_data: HashMap<String, Value>,
}

impl BaseForm {
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            initial: HashMap::new(),
            bound: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
        }
    }

    /// Sets the value shown by an unbound form.
    #[must_use]
    pub fn with_initial(mut self, name: &str, value: impl Into<String>) -> Self {
        self.initial.insert(name.to_string(), vec![value.into()]);
        self
    }

    /// Sets the values shown by an unbound multi-valued field.
    #[must_use]
    pub fn with_initial_list(mut self, name: &str, values: Vec<String>) -> Self {
        self.initial.insert(name.to_string(), values);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.field_defs.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormFieldDef> {
        self.field_defs.iter_mut().find(|f| f.name == name)
    }

    /// Replaces the choices of a choice field.
    pub fn set_choices(&mut self, name: &str, new_choices: Vec<(String, String)>) {
        if let Some(field) = self.field_mut(name) {
            match &mut field.field_type {
                FormFieldType::Choice { choices } | FormFieldType::MultipleChoice { choices } => {
                    *choices = new_choices;
                }
                _ => {}
            }
        }
    }

    /// Records an error for `field` (or [`NON_FIELD_ERRORS`]) and drops the
    /// field's cleaned value.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self.cleaned_data.remove(field);
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|e| !e.is_empty())
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get(NON_FIELD_ERRORS).map_or(&[], Vec::as_slice)
    }

    /// The cleaned string value of a field.
    pub fn cleaned_str(&self, name: &str) -> Option<&str> {
        self.cleaned_data.get(name).and_then(Value::as_str)
    }

    pub fn cleaned_bool(&self, name: &str) -> bool {
        self.cleaned_data
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The cleaned values of a multiple-choice field.
    pub fn cleaned_list(&self, name: &str) -> Vec<String> {
        self.cleaned_data
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bound_fields(&self) -> Vec<BoundField> {
        self.field_defs
            .iter()
            .map(|field| {
                let values = if self.bound {
                    self.raw_data.get(&field.name).cloned().unwrap_or_default()
                } else {
                    self.initial.get(&field.name).cloned().unwrap_or_default()
                };
                let errors = self.errors.get(&field.name).cloned().unwrap_or_default();
                BoundField::new(field, values, errors)
            })
            .collect()
    }

    fn clean_fields(&mut self) {
        for field in &self.field_defs {
            let raw = self
                .raw_data
                .get(&field.name)
                .map_or(&[][..], Vec::as_slice);
            match clean_field_value(field, raw) {
                Ok(value) => {
                    self.cleaned_data.insert(field.name.clone(), value);
                }
                Err(field_errors) => {
                    self.errors.insert(field.name.clone(), field_errors);
                }
            }
        }
    }
}

#[async_trait]
impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn bind(&mut self, data: &QueryDict) {
        self.bound = true;
        self.raw_data.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let values = data.get_list(&field.name).to_vec();
            self.raw_data.insert(field.name.clone(), values);
        }
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    async fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }
        self.errors.clear();
        self.cleaned_data.clear();
        self.clean_fields();
        self.errors.is_empty()
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.cleaned_data
    }

    fn as_context(&self) -> Value {
        let bound_fields = self.bound_fields();
        let mut ctx = serde_json::Map::new();

        for bf in &bound_fields {
            ctx.insert(bf.name.clone(), bf.to_context());
        }
        ctx.insert(
            "fields".to_string(),
            Value::Array(bound_fields.iter().map(BoundField::to_context).collect()),
        );
        ctx.insert("errors".to_string(), json!(self.errors));
        ctx.insert(
            "non_field_errors".to_string(),
            json!(self.non_field_errors()),
        );
        ctx.insert("is_bound".to_string(), Value::Bool(self.bound));
        Value::Object(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormFieldType;

    fn make_form() -> BaseForm {
        BaseForm::new(vec![
            FormFieldDef::new("name", FormFieldType::char(255)),
            FormFieldDef::new("country", FormFieldType::char(255)),
        ])
    }

    #[tokio::test]
    async fn test_unbound_form_is_invalid() {
        let mut form = make_form();
        assert!(!form.is_bound());
        assert!(!form.is_valid().await);
    }

    #[tokio::test]
    async fn test_valid_form() {
        let mut form = make_form();
        form.bind(&QueryDict::parse("name=Ford&country=USA"));
        assert!(form.is_valid().await);
        assert_eq!(form.cleaned_str("name"), Some("Ford"));
        assert_eq!(form.cleaned_str("country"), Some("USA"));
    }

    #[tokio::test]
    async fn test_errors_accumulate() {
        let mut form = make_form();
        form.bind(&QueryDict::new());
        assert!(!form.is_valid().await);
        assert!(form.has_error("name"));
        assert!(form.has_error("country"));
        assert!(form.cleaned_data().is_empty());
    }

    #[tokio::test]
    async fn test_add_error_drops_cleaned_value() {
        let mut form = make_form();
        form.bind(&QueryDict::parse("name=Ford&country=USA"));
        assert!(form.is_valid().await);
        form.add_error("name", "taken");
        form.add_error(NON_FIELD_ERRORS, "nope");
        assert!(form.cleaned_str("name").is_none());
        assert_eq!(form.non_field_errors(), ["nope"]);
    }

    #[tokio::test]
    async fn test_context_shows_submitted_values_and_errors() {
        let mut form = make_form();
        form.bind(&QueryDict::parse("name=Ford"));
        assert!(!form.is_valid().await);
        let ctx = form.as_context();
        assert_eq!(ctx["name"]["value"], "Ford");
        assert_eq!(ctx["errors"]["country"][0], "This field is required.");
        assert_eq!(ctx["is_bound"], true);
        assert_eq!(ctx["fields"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_unbound_context_uses_initial() {
        let form = make_form().with_initial("name", "Tesla");
        let ctx = form.as_context();
        assert_eq!(ctx["name"]["value"], "Tesla");
        assert_eq!(ctx["is_bound"], false);
    }

    #[test]
    fn test_set_choices() {
        let mut form = BaseForm::new(vec![FormFieldDef::new(
            "manufacturer",
            FormFieldType::Choice { choices: vec![] },
        )]);
        form.set_choices("manufacturer", vec![("1".to_string(), "Ford USA".to_string())]);
        assert_eq!(
            form.field("manufacturer").map(|f| f.field_type.choices().len()),
            Some(1)
        );
    }
}
