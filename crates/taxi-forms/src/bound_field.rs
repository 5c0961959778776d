//! Bound fields: a field definition paired with its current values and errors.
//!
//! Templates iterate over bound fields to render form rows.

use std::collections::BTreeMap;

use serde_json::json;

use crate::fields::FormFieldDef;
use crate::widgets::{escape, WidgetType};

/// A form field bound to data and validation state.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: String,
    pub label: String,
    pub help_text: String,
    pub required: bool,
    pub widget: WidgetType,
    pub choices: Vec<(String, String)>,
    pub attrs: BTreeMap<String, String>,
    /// Submitted values when bound, initial values otherwise.
    pub values: Vec<String>,
    pub errors: Vec<String>,
}

impl BoundField {
    pub fn new(field_def: &FormFieldDef, values: Vec<String>, errors: Vec<String>) -> Self {
        Self {
            name: field_def.name.clone(),
            label: field_def.label.clone(),
            help_text: field_def.help_text.clone(),
            required: field_def.required,
            widget: field_def.widget,
            choices: field_def.field_type.choices().to_vec(),
            attrs: field_def.attrs.clone(),
            values,
            errors,
        }
    }

    pub fn auto_id(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Renders the widget HTML.
    pub fn render(&self) -> String {
        let mut attrs = self.attrs.clone();
        attrs.insert("id".to_string(), self.auto_id());
        if self.required && self.widget != WidgetType::CheckboxSelectMultiple {
            attrs.insert("required".to_string(), String::new());
        }
        self.widget
            .render(&self.name, &self.values, &self.choices, &attrs)
    }

    /// Renders a `<label>` for the widget.
    pub fn label_tag(&self) -> String {
        format!(
            r#"<label for="{}">{}:</label>"#,
            escape(&self.auto_id()),
            escape(&self.label)
        )
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Renders the errors as `<ul class="errorlist">`, or nothing.
    pub fn errors_as_ul(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let items: String = self
            .errors
            .iter()
            .map(|e| format!("<li>{}</li>", escape(e)))
            .collect();
        format!(r#"<ul class="errorlist">{items}</ul>"#)
    }

    /// The template context for this field. `html`, `label_tag` and
    /// `errors_html` are already escaped.
    pub fn to_context(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "label": self.label,
            "help_text": self.help_text,
            "required": self.required,
            "value": self.values.last().cloned().unwrap_or_default(),
            "values": self.values,
            "errors": self.errors,
            "html": self.render(),
            "label_tag": self.label_tag(),
            "errors_html": self.errors_as_ul(),
        })
    }
}
