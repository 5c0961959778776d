//! Single-field search forms for the list pages.
//!
//! Each form has one optional text field (`name`, `model` or `username`).
//! A blank or missing value means "no filter".

use serde_json::Value;

use taxi_core::QueryDict;

use crate::fields::{FormFieldDef, FormFieldType};
use crate::form::{BaseForm, Form};

/// A list page's search box.
#[derive(Debug)]
pub struct SearchForm {
    field: &'static str,
    inner: BaseForm,
}

impl SearchForm {
    fn new(field: &'static str, placeholder: &str) -> Self {
        Self {
            field,
            inner: BaseForm::new(vec![FormFieldDef::new(field, FormFieldType::char(255))
                .required(false)
                .label("")
                .attr("placeholder", placeholder)]),
        }
    }

    /// Searches manufacturers by `name`.
    pub fn manufacturer() -> Self {
        Self::new("name", "Search by name")
    }

    /// Searches cars by `model`.
    pub fn car() -> Self {
        Self::new("model", "Search by model")
    }

    /// Searches drivers by `username`.
    pub fn driver() -> Self {
        Self::new("username", "Search by username")
    }

    pub const fn field_name(&self) -> &'static str {
        self.field
    }

    /// Binds the request's query string and returns the search term, if any.
    ///
    /// The rendered form is pre-filled with the submitted value either way.
    pub async fn search_term(&mut self, query: &QueryDict) -> Option<String> {
        self.inner.bind(query);
        if !self.inner.is_valid().await {
            tracing::debug!(field = self.field, "search term rejected");
            return None;
        }
        self.inner
            .cleaned_str(self.field)
            .filter(|term| !term.is_empty())
            .map(String::from)
    }

    pub fn as_context(&self) -> Value {
        self.inner.as_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_term_present() {
        let mut form = SearchForm::manufacturer();
        let term = form.search_term(&QueryDict::parse("name=first_name")).await;
        assert_eq!(term.as_deref(), Some("first_name"));
        assert_eq!(form.as_context()["name"]["value"], "first_name");
    }

    #[tokio::test]
    async fn test_term_absent_or_blank() {
        let mut form = SearchForm::car();
        assert!(form.search_term(&QueryDict::new()).await.is_none());
        assert!(form.search_term(&QueryDict::parse("model=++")).await.is_none());
        assert_eq!(form.field_name(), "model");
    }

    #[tokio::test]
    async fn test_term_is_trimmed() {
        let mut form = SearchForm::driver();
        let term = form.search_term(&QueryDict::parse("username=%20bob%20")).await;
        assert_eq!(term.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_overlong_term_is_ignored() {
        let mut form = SearchForm::driver();
        let long = "a".repeat(300);
        let query = QueryDict::from_pairs([("username", long.as_str())]);
        assert!(form.search_term(&query).await.is_none());
    }

    #[test]
    fn test_context_renders_placeholder() {
        let form = SearchForm::manufacturer();
        let html = form.as_context()["name"]["html"]
            .as_str()
            .map(String::from)
            .unwrap_or_default();
        assert!(html.contains(r#"placeholder="Search by name""#));
    }
}
