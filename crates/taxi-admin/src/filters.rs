//! Changelist filter sidebar.
//!
//! A [`FilterSpec`] is one `list_filter` entry resolved against the
//! database: its title, the choices and which one is selected.

use serde::{Deserialize, Serialize};

use taxi_core::QueryDict;

/// A single choice within a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChoice {
    /// The label shown to the user.
    pub display: String,
    /// The query parameter value. Empty means "All".
    pub value: String,
    pub selected: bool,
    /// The changelist query string that selects this choice.
    pub query_string: String,
}

/// A resolved filter with its choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    /// The field name, also the query parameter.
    pub field: String,
    /// "By manufacturer" and so on.
    pub title: String,
    pub choices: Vec<FilterChoice>,
}

impl FilterSpec {
    /// Builds a filter from `(display, value)` pairs, prefixed with "All".
    ///
    /// Each choice's query string keeps the other parameters of `current`.
    pub fn new(field: &str, choices: Vec<(String, String)>, current: &QueryDict) -> Self {
        let selected = current.get(field).unwrap_or_default();
        let all = std::iter::once(("All".to_string(), String::new()));
        let choices = all
            .chain(choices)
            .map(|(display, value)| {
                let mut query = current.clone();
                if value.is_empty() {
                    query.remove(field);
                } else {
                    query.set(field, &value);
                }
                FilterChoice {
                    selected: value == selected,
                    query_string: format!("?{}", query.urlencode()),
                    display,
                    value,
                }
            })
            .collect();
        Self {
            field: field.to_string(),
            title: format!("By {}", field.replace('_', " ")),
            choices,
        }
    }

    /// A yes/no filter over a boolean field, using `1` and `0`.
    pub fn boolean(field: &str, current: &QueryDict) -> Self {
        Self::new(
            field,
            vec![
                ("Yes".to_string(), "1".to_string()),
                ("No".to_string(), "0".to_string()),
            ],
            current,
        )
    }
}

/// Parses a boolean filter value.
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value? {
        "1" | "true" | "True" => Some(true),
        "0" | "false" | "False" => Some(false),
        _ => None,
    }
}
