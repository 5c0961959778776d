//! The login form.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use taxi_auth::authenticate;
use taxi_core::{QueryDict, TaxiResult};
use taxi_db::{Driver, SqliteBackend};

use crate::fields::{FormFieldDef, FormFieldType};
use crate::form::{settle, BaseForm, Form, NON_FIELD_ERRORS};
use crate::widgets::WidgetType;

pub const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Username and password. A successful validation keeps the
/// authenticated driver for the caller to log in.
#[derive(Debug)]
pub struct AuthenticationForm {
    inner: BaseForm,
    db: SqliteBackend,
    user: Option<Driver>,
}

impl AuthenticationForm {
    pub fn new(db: SqliteBackend) -> Self {
        Self {
            inner: BaseForm::new(vec![
                FormFieldDef::new("username", FormFieldType::char(150))
                    .attr("autofocus", ""),
                FormFieldDef::new(
                    "password",
                    FormFieldType::Char {
                        min_length: None,
                        max_length: None,
                        strip: false,
                    },
                )
                .widget(WidgetType::PasswordInput),
            ]),
            db,
            user: None,
        }
    }

    pub async fn validate(&mut self) -> TaxiResult<bool> {
        self.user = None;
        if !self.inner.is_bound() || !self.inner.is_valid().await {
            return Ok(false);
        }
        let username = self.inner.cleaned_str("username").unwrap_or_default().to_string();
        let password = self.inner.cleaned_str("password").unwrap_or_default().to_string();
        match authenticate(&self.db, &username, &password).await? {
            Some(driver) => {
                self.user = Some(driver);
                Ok(true)
            }
            None => {
                self.inner.add_error(NON_FIELD_ERRORS, INVALID_LOGIN);
                Ok(false)
            }
        }
    }

    /// The driver authenticated by the last successful validation.
    pub const fn user(&self) -> Option<&Driver> {
        self.user.as_ref()
    }

    pub fn into_user(self) -> Option<Driver> {
        self.user
    }
}

#[async_trait]
impl Form for AuthenticationForm {
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

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_auth::users::create_user;
    use taxi_db::{schema, NewDriver};

    async fn setup() -> SqliteBackend {
        let db = SqliteBackend::memory().unwrap();
        schema::migrate(&db).await.unwrap();
        create_user(
            &db,
            NewDriver {
                username: "test".to_string(),
                license_number: Some("TST12345".to_string()),
                ..NewDriver::default()
            },
            "test123user",
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_valid_login() {
        let db = setup().await;
        let mut form = AuthenticationForm::new(db);
        form.bind(&QueryDict::parse("username=test&password=test123user"));
        assert!(form.is_valid().await);
        assert_eq!(form.user().map(|d| d.username.as_str()), Some("test"));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let db = setup().await;
        let mut form = AuthenticationForm::new(db);
        form.bind(&QueryDict::parse("username=test&password=nope"));
        assert!(!form.is_valid().await);
        assert!(form.user().is_none());
        assert_eq!(form.errors()[NON_FIELD_ERRORS], vec![INVALID_LOGIN.to_string()]);
        assert_eq!(form.as_context()["non_field_errors"][0], INVALID_LOGIN);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let db = setup().await;
        let mut form = AuthenticationForm::new(db);
        form.bind(&QueryDict::parse("username=test"));
        assert!(!form.is_valid().await);
        assert!(form.errors().contains_key("password"));
        assert!(!form.errors().contains_key(NON_FIELD_ERRORS));
    }

    #[tokio::test]
    async fn test_password_is_not_rendered_back() {
        let db = setup().await;
        let mut form = AuthenticationForm::new(db);
        form.bind(&QueryDict::parse("username=test&password=secret"));
        form.is_valid().await;
        let html = form.as_context()["password"]["html"]
            .as_str()
            .map(String::from)
            .unwrap_or_default();
        assert!(!html.contains("secret"));
    }
}
