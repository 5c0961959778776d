//! HTML rendering for form inputs.
//!
//! Every attribute value and option label is HTML-escaped.

use std::collections::BTreeMap;
use std::fmt;

/// The kinds of input a field can render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="password">`. Never renders its value back.
    PasswordInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
    /// One `<input type="checkbox">` per choice.
    CheckboxSelectMultiple,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::EmailInput => "EmailInput",
            Self::PasswordInput => "PasswordInput",
            Self::HiddenInput => "HiddenInput",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
            Self::SelectMultiple => "SelectMultiple",
            Self::CheckboxSelectMultiple => "CheckboxSelectMultiple",
        };
        write!(f, "{name}")
    }
}

/// Escapes `& < > " '` for use in HTML text and attribute values.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats attributes as ` key="value"`, sorted by key.
fn render_attrs(attrs: &BTreeMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{}""#, escape(v)))
        .collect()
}

impl WidgetType {
    /// Renders the widget.
    ///
    /// `values` holds the submitted or initial values; single-valued widgets
    /// use the first. `choices` are `(value, label)` pairs for the select and
    /// checkbox-list widgets.
    pub fn render(
        self,
        name: &str,
        values: &[String],
        choices: &[(String, String)],
        attrs: &BTreeMap<String, String>,
    ) -> String {
        let name_attr = escape(name);
        let first = values.first().map(String::as_str).unwrap_or_default();
        let value_attr = if first.is_empty() {
            String::new()
        } else {
            format!(r#" value="{}""#, escape(first))
        };
        let extra = render_attrs(attrs);

        match self {
            Self::TextInput => {
                format!(r#"<input type="text" name="{name_attr}"{value_attr}{extra}>"#)
            }
            Self::EmailInput => {
                format!(r#"<input type="email" name="{name_attr}"{value_attr}{extra}>"#)
            }
            Self::HiddenInput => {
                format!(r#"<input type="hidden" name="{name_attr}"{value_attr}{extra}>"#)
            }
            Self::PasswordInput => format!(r#"<input type="password" name="{name_attr}"{extra}>"#),
            Self::CheckboxInput => {
                let checked = if matches!(first, "on" | "true" | "1") {
                    " checked"
                } else {
                    ""
                };
                format!(r#"<input type="checkbox" name="{name_attr}"{checked}{extra}>"#)
            }
            Self::Select | Self::SelectMultiple => {
                let multiple = if self == Self::SelectMultiple {
                    " multiple"
                } else {
                    ""
                };
                let options: String = choices
                    .iter()
                    .map(|(value, label)| {
                        let selected = if values.iter().any(|v| v == value) {
                            " selected"
                        } else {
                            ""
                        };
                        format!(
                            r#"<option value="{}"{selected}>{}</option>"#,
                            escape(value),
                            escape(label)
                        )
                    })
                    .collect();
                format!(r#"<select name="{name_attr}"{multiple}{extra}>{options}</select>"#)
            }
            Self::CheckboxSelectMultiple => {
                let id_base = attrs.get("id").cloned().unwrap_or_default();
                let items: String = choices
                    .iter()
                    .enumerate()
                    .map(|(i, (value, label))| {
                        let checked = if values.iter().any(|v| v == value) {
                            " checked"
                        } else {
                            ""
                        };
                        format!(
                            r#"<li><label for="{id}_{i}"><input type="checkbox" name="{name_attr}" value="{}" id="{id}_{i}"{checked}> {}</label></li>"#,
                            escape(value),
                            escape(label),
                            id = escape(&id_base),
                        )
                    })
                    .collect();
                format!(r#"<ul id="{}">{items}</ul>"#, escape(&id_base))
            }
        }
    }
}
