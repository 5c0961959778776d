//! Form field definitions and field-level cleaning.
//!
//! A [`FormFieldDef`] describes one input: its type, label, widget and
//! validators. [`clean_field_value`] turns the raw submitted strings into a
//! JSON value or a list of error messages.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::validators::Validator;
use crate::widgets::WidgetType;

/// The type of a form field and its type-specific parameters.
#[derive(Debug, Clone)]
pub enum FormFieldType {
    /// A string field. Lengths count characters.
    Char {
        min_length: Option<usize>,
        max_length: Option<usize>,
        /// Trim surrounding whitespace before validating.
        strip: bool,
    },
    /// An email address. Blank is allowed when not required.
    Email { max_length: Option<usize> },
    /// A checkbox. Never fails the required check when not required.
    Boolean,
    /// One value out of `(value, label)` choices.
    Choice { choices: Vec<(String, String)> },
    /// Any number of values out of `(value, label)` choices.
    MultipleChoice { choices: Vec<(String, String)> },
}

impl FormFieldType {
    /// A stripped string field with an upper length bound.
    pub const fn char(max_length: usize) -> Self {
        Self::Char {
            min_length: None,
            max_length: Some(max_length),
            strip: true,
        }
    }

    /// The `(value, label)` choices of a choice field, or nothing.
    pub fn choices(&self) -> &[(String, String)] {
        match self {
            Self::Choice { choices } | Self::MultipleChoice { choices } => choices,
            _ => &[],
        }
    }
}

/// Complete definition of a form field.
#[derive(Debug)]
pub struct FormFieldDef {
    /// The HTML `name`.
    pub name: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub help_text: String,
    pub label: String,
    pub widget: WidgetType,
    /// Run in order after type cleaning; every failure is reported.
    pub validators: Vec<Box<dyn Validator>>,
    /// Custom messages keyed by error code (`required`, `max_length`).
    pub error_messages: HashMap<String, String>,
    /// Extra HTML attributes for the widget.
    pub attrs: BTreeMap<String, String>,
}

impl FormFieldDef {
    /// Creates a required field with the default widget for its type and a
    /// label derived from the name.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget = default_widget_for_field_type(&field_type);
        let label = default_label(&name);
        Self {
            name,
            field_type,
            required: true,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            attrs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub const fn widget(mut self, widget: WidgetType) -> Self {
        self.widget = widget;
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    fn message(&self, code: &str, default: impl FnOnce() -> String) -> String {
        self.error_messages.get(code).cloned().unwrap_or_else(default)
    }
}

/// `"first_name"` becomes `"First name"`.
fn default_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

pub const fn default_widget_for_field_type(field_type: &FormFieldType) -> WidgetType {
    match field_type {
        FormFieldType::Char { .. } => WidgetType::TextInput,
        FormFieldType::Email { .. } => WidgetType::EmailInput,
        FormFieldType::Boolean => WidgetType::CheckboxInput,
        FormFieldType::Choice { .. } => WidgetType::Select,
        FormFieldType::MultipleChoice { .. } => WidgetType::CheckboxSelectMultiple,
    }
}

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").ok());

fn check_length(
    field: &FormFieldDef,
    value: &str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    errors: &mut Vec<String>,
) {
    let len = value.chars().count();
    if let Some(min) = min_length {
        if len < min {
            errors.push(field.message("min_length", || {
                format!("Ensure this value has at least {min} characters (it has {len}).")
            }));
        }
    }
    if let Some(max) = max_length {
        if len > max {
            errors.push(field.message("max_length", || {
                format!("Ensure this value has at most {max} characters (it has {len}).")
            }));
        }
    }
}

/// Cleans the raw values submitted for one field.
///
/// Single-valued fields use the last submitted value. Empty optional fields
/// clean to `""` (strings), `false` (booleans) or `[]` (multiple choice).
pub fn clean_field_value(field: &FormFieldDef, raw: &[String]) -> Result<Value, Vec<String>> {
    let last = raw.last().map_or("", String::as_str);
    let mut errors = Vec::new();

    let value = match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            strip,
        } => {
            let s = if *strip { last.trim() } else { last };
            if s.is_empty() {
                if field.required {
                    return Err(vec![required_message(field)]);
                }
                return Ok(Value::String(String::new()));
            }
            check_length(field, s, *min_length, *max_length, &mut errors);
            Value::String(s.to_string())
        }

        FormFieldType::Email { max_length } => {
            let s = last.trim();
            if s.is_empty() {
                if field.required {
                    return Err(vec![required_message(field)]);
                }
                return Ok(Value::String(String::new()));
            }
            check_length(field, s, None, *max_length, &mut errors);
            if !EMAIL_RE.as_ref().is_some_and(|re| re.is_match(s)) {
                errors.push(field.message("invalid", || "Enter a valid email address.".to_string()));
            }
            Value::String(s.to_string())
        }

        FormFieldType::Boolean => {
            let checked = matches!(last.to_lowercase().as_str(), "on" | "true" | "1" | "yes");
            if field.required && !checked {
                return Err(vec![required_message(field)]);
            }
            Value::Bool(checked)
        }

        FormFieldType::Choice { choices } => {
            if last.is_empty() {
                if field.required {
                    return Err(vec![required_message(field)]);
                }
                return Ok(Value::String(String::new()));
            }
            if !choices.iter().any(|(v, _)| v == last) {
                errors.push(invalid_choice(field, last));
            }
            Value::String(last.to_string())
        }

        FormFieldType::MultipleChoice { choices } => {
            let selected: Vec<&str> = raw
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
            if selected.is_empty() && field.required {
                return Err(vec![required_message(field)]);
            }
            for s in &selected {
                if !choices.iter().any(|(v, _)| v == s) {
                    errors.push(invalid_choice(field, s));
                }
            }
            Value::Array(
                selected
                    .into_iter()
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )
        }
    };

    if errors.is_empty() {
        if let Value::String(s) = &value {
            errors.extend(field.validators.iter().filter_map(|v| v.validate(s).err()));
        }
    }

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

fn required_message(field: &FormFieldDef) -> String {
    field.message("required", || "This field is required.".to_string())
}

fn invalid_choice(field: &FormFieldDef, value: &str) -> String {
    field.message("invalid_choice", || {
        format!("Select a valid choice. {value} is not one of the available choices.")
    })
}
