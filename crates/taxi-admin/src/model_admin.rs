//! Model administration configuration.
//!
//! A [`ModelAdmin`] says how one entity appears in the admin: which columns
//! the changelist shows, which fields the search box covers, which sidebar
//! filters exist and which form fields the add and change pages render.

use serde::{Deserialize, Serialize};

/// Configuration for how a model is displayed and managed in the admin.
///
/// # Examples
///
/// ```
/// use taxi_admin::model_admin::ModelAdmin;
///
/// let admin = ModelAdmin::new("taxi", "car")
///     .search_fields(vec!["model"])
///     .list_filter(vec!["manufacturer"]);
/// assert_eq!(admin.key(), "taxi.car");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAdmin {
    /// The application label, `taxi`.
    pub app_label: String,
    /// The model name in lowercase, used in URLs.
    pub model_name: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    /// Changelist columns. `__str__` shows the object's display string.
    pub list_display: Vec<String>,
    /// Fields the `?q=` search covers. Empty hides the search box.
    pub search_fields: Vec<String>,
    /// Sidebar filters, each a field name usable as a query parameter.
    pub list_filter: Vec<String>,
    /// Fields on the change form. Empty means every form field.
    pub fields: Vec<String>,
    /// Fields on the add form. Empty means the same as `fields`.
    pub add_fields: Vec<String>,
}

impl ModelAdmin {
    /// Creates a `ModelAdmin` with the default configuration.
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        let model = model_name.into();
        let verbose = model.replace('_', " ");
        let verbose_plural = format!("{verbose}s");
        Self {
            app_label: app_label.into(),
            model_name: model,
            verbose_name: verbose,
            verbose_name_plural: verbose_plural,
            list_display: vec!["__str__".to_string()],
            search_fields: Vec::new(),
            list_filter: Vec::new(),
            fields: Vec::new(),
            add_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    #[must_use]
    pub fn list_display(mut self, fields: Vec<&str>) -> Self {
        self.list_display = fields.into_iter().map(String::from).collect();
        self
    }

    #[must_use]
    pub fn search_fields(mut self, fields: Vec<&str>) -> Self {
        self.search_fields = fields.into_iter().map(String::from).collect();
        self
    }

    #[must_use]
    pub fn list_filter(mut self, fields: Vec<&str>) -> Self {
        self.list_filter = fields.into_iter().map(String::from).collect();
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<&str>) -> Self {
        self.fields = fields.into_iter().map(String::from).collect();
        self
    }

    #[must_use]
    pub fn add_fields(mut self, fields: Vec<&str>) -> Self {
        self.add_fields = fields.into_iter().map(String::from).collect();
        self
    }

    /// `"{app_label}.{model_name}"`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// The changelist URL.
    pub fn changelist_url(&self) -> String {
        format!("/admin/{}/{}/", self.app_label, self.model_name)
    }

    pub fn add_url(&self) -> String {
        format!("{}add/", self.changelist_url())
    }

    pub fn change_url(&self, pk: i64) -> String {
        format!("{}{pk}/change/", self.changelist_url())
    }

    pub fn delete_url(&self, pk: i64) -> String {
        format!("{}{pk}/delete/", self.changelist_url())
    }

    /// The form fields shown on the add page (`adding`) or change page.
    pub fn form_fields(&self, adding: bool) -> &[String] {
        if adding && !self.add_fields.is_empty() {
            &self.add_fields
        } else {
            &self.fields
        }
    }

    pub fn has_search(&self) -> bool {
        !self.search_fields.is_empty()
    }
}

/// A changelist column heading: `license_number` becomes `License number`.
pub fn column_label(field: &str) -> String {
    if field == "__str__" {
        return String::new();
    }
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let admin = ModelAdmin::new("taxi", "manufacturer");
        assert_eq!(admin.list_display, vec!["__str__"]);
        assert!(admin.search_fields.is_empty());
        assert!(admin.list_filter.is_empty());
        assert!(!admin.has_search());
        assert_eq!(admin.verbose_name_plural, "manufacturers");
    }

    #[test]
    fn test_urls() {
        let admin = ModelAdmin::new("taxi", "car");
        assert_eq!(admin.changelist_url(), "/admin/taxi/car/");
        assert_eq!(admin.add_url(), "/admin/taxi/car/add/");
        assert_eq!(admin.change_url(3), "/admin/taxi/car/3/change/");
        assert_eq!(admin.delete_url(3), "/admin/taxi/car/3/delete/");
    }

    #[test]
    fn test_form_fields_fall_back_to_change_fields() {
        let admin = ModelAdmin::new("taxi", "driver").fields(vec!["username", "license_number"]);
        assert_eq!(admin.form_fields(true), ["username", "license_number"]);

        let admin = admin.add_fields(vec!["username", "password1"]);
        assert_eq!(admin.form_fields(true), ["username", "password1"]);
        assert_eq!(admin.form_fields(false), ["username", "license_number"]);
    }

    #[test]
    fn test_column_label() {
        assert_eq!(column_label("license_number"), "License number");
        assert_eq!(column_label("is_staff"), "Is staff");
        assert_eq!(column_label("__str__"), "");
    }
}
