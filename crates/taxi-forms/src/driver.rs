//! Driver forms.
//!
//! - [`DriverCreationForm`] - Account fields plus a license number
//! - [`DriverLicenseUpdateForm`] - Only the license number
//! - [`DriverChangeForm`] - Every editable field, for the admin

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use taxi_auth::hashers::{password_validators_help_texts, validate_password};
use taxi_auth::users::create_user;
use taxi_core::{QueryDict, TaxiResult};
use taxi_db::drivers::{self, DriverChanges};
use taxi_db::{Driver, NewDriver, SqliteBackend};

use crate::fields::{FormFieldDef, FormFieldType};
use crate::form::{settle, BaseForm, Form};
use crate::validators::{LicenseNumberValidator, UsernameValidator};
use crate::widgets::WidgetType;

pub const DUPLICATE_USERNAME: &str = "A user with that username already exists.";
pub const DUPLICATE_LICENSE: &str = "Driver with this License number already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

fn username_field() -> FormFieldDef {
    FormFieldDef::new("username", FormFieldType::char(150))
        .help_text("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
        .validator(Box::new(UsernameValidator))
}

fn name_field(name: &str) -> FormFieldDef {
    FormFieldDef::new(name, FormFieldType::char(150)).required(false)
}

fn password_field(name: &str, label: &str) -> FormFieldDef {
    FormFieldDef::new(
        name,
        FormFieldType::Char {
            min_length: None,
            max_length: None,
            strip: false,
        },
    )
    .label(label)
    .widget(WidgetType::PasswordInput)
}

fn license_field(required: bool) -> FormFieldDef {
    FormFieldDef::new("license_number", FormFieldType::char(255))
        .required(required)
        .validator(Box::new(LicenseNumberValidator))
}

fn checkbox(name: &str, help: &str) -> FormFieldDef {
    FormFieldDef::new(name, FormFieldType::Boolean)
        .required(false)
        .help_text(help)
}

// ── DriverCreationForm ──────────────────────────────────────────────

/// Registration of a new driver.
///
/// Fields: `username`, `password1`, `password2`, `first_name`, `last_name`,
/// `license_number`.
#[derive(Debug)]
pub struct DriverCreationForm {
    inner: BaseForm,
    db: SqliteBackend,
}

impl DriverCreationForm {
    pub fn new(db: SqliteBackend) -> Self {
        let help = password_validators_help_texts().join(" ");
        Self {
            inner: BaseForm::new(vec![
                username_field(),
                password_field("password1", "Password").help_text(help),
                password_field("password2", "Password confirmation")
                    .help_text("Enter the same password as before, for verification."),
                name_field("first_name"),
                name_field("last_name"),
                license_field(true),
            ]),
            db,
        }
    }

    /// Validates the form, propagating storage failures.
    pub async fn validate(&mut self) -> TaxiResult<bool> {
        if !self.inner.is_bound() {
            return Ok(false);
        }
        self.inner.is_valid().await;
        check_creation(&mut self.inner, &self.db).await?;
        Ok(self.inner.errors().is_empty())
    }

    /// Creates the driver with a hashed password.
    ///
    /// Only call after a successful validation.
    pub async fn save(&self) -> TaxiResult<Driver> {
        let new = NewDriver {
            username: self.inner.cleaned_str("username").unwrap_or_default().to_string(),
            first_name: self.inner.cleaned_str("first_name").unwrap_or_default().to_string(),
            last_name: self.inner.cleaned_str("last_name").unwrap_or_default().to_string(),
            license_number: self.inner.cleaned_str("license_number").map(String::from),
            ..NewDriver::default()
        };
        let password = self.inner.cleaned_str("password1").unwrap_or_default();
        create_user(&self.db, new, password).await
    }
}

async fn check_creation(form: &mut BaseForm, db: &SqliteBackend) -> TaxiResult<()> {
    if let Some(username) = form.cleaned_str("username").map(String::from) {
        if drivers::username_exists(db, &username, None).await? {
            form.add_error("username", DUPLICATE_USERNAME);
        }
    }

    let password1 = form.cleaned_str("password1").map(String::from);
    let password2 = form.cleaned_str("password2").map(String::from);
    if let (Some(p1), Some(p2)) = (password1, password2) {
        if p1 == p2 {
            if let Err(messages) = validate_password(&p2) {
                for message in messages {
                    form.add_error("password2", message);
                }
            }
        } else {
            form.add_error("password2", PASSWORD_MISMATCH);
        }
    }

    if let Some(license) = form.cleaned_str("license_number").map(String::from) {
        if drivers::license_exists(db, &license, None).await? {
            form.add_error("license_number", DUPLICATE_LICENSE);
        }
    }
    Ok(())
}

#[async_trait]
impl Form for DriverCreationForm {
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

// ── DriverLicenseUpdateForm ─────────────────────────────────────────

/// Changes one driver's license number.
#[derive(Debug)]
pub struct DriverLicenseUpdateForm {
    inner: BaseForm,
    db: SqliteBackend,
    driver_id: i64,
}

impl DriverLicenseUpdateForm {
    /// Creates the form pre-filled with the driver's current license.
    pub fn new(db: SqliteBackend, driver: &Driver) -> Self {
        let mut inner = BaseForm::new(vec![license_field(true)]);
        if let Some(license) = &driver.license_number {
            inner = inner.with_initial("license_number", license.clone());
        }
        Self {
            inner,
            db,
            driver_id: driver.id,
        }
    }

    pub async fn validate(&mut self) -> TaxiResult<bool> {
        if !self.inner.is_bound() {
            return Ok(false);
        }
        self.inner.is_valid().await;
        check_license_unique(&mut self.inner, &self.db, self.driver_id).await?;
        Ok(self.inner.errors().is_empty())
    }

    /// Stores the new license number.
    pub async fn save(&self) -> TaxiResult<Driver> {
        let license = self.inner.cleaned_str("license_number").unwrap_or_default();
        drivers::update_license(&self.db, self.driver_id, license).await
    }
}

async fn check_license_unique(form: &mut BaseForm, db: &SqliteBackend, driver_id: i64) -> TaxiResult<()> {
    let license = form
        .cleaned_str("license_number")
        .filter(|l| !l.is_empty())
        .map(String::from);
    if let Some(license) = license {
        if drivers::license_exists(db, &license, Some(driver_id)).await? {
            form.add_error("license_number", DUPLICATE_LICENSE);
        }
    }
    Ok(())
}

#[async_trait]
impl Form for DriverLicenseUpdateForm {
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

// ── DriverChangeForm ────────────────────────────────────────────────

/// Admin edit of an existing driver. The license number may be left blank
/// (superusers have none) but must follow the license rule when given.
#[derive(Debug)]
pub struct DriverChangeForm {
    inner: BaseForm,
    db: SqliteBackend,
    driver_id: i64,
}

impl DriverChangeForm {
    pub fn new(db: SqliteBackend, driver: &Driver) -> Self {
        let flag = |on: bool| if on { "on" } else { "" };
        let inner = BaseForm::new(vec![
            username_field(),
            name_field("first_name"),
            name_field("last_name"),
            FormFieldDef::new("email", FormFieldType::Email { max_length: Some(254) })
                .required(false)
                .label("Email address"),
            checkbox("is_active", "Unselect this instead of deleting the account."),
            checkbox("is_staff", "Designates whether the user can log into the admin site."),
            checkbox("is_superuser", "Designates that this user has all permissions."),
            license_field(false),
        ])
        .with_initial("username", driver.username.clone())
        .with_initial("first_name", driver.first_name.clone())
        .with_initial("last_name", driver.last_name.clone())
        .with_initial("email", driver.email.clone())
        .with_initial("is_active", flag(driver.is_active))
        .with_initial("is_staff", flag(driver.is_staff))
        .with_initial("is_superuser", flag(driver.is_superuser))
        .with_initial(
            "license_number",
            driver.license_number.clone().unwrap_or_default(),
        );
        Self {
            inner,
            db,
            driver_id: driver.id,
        }
    }

    pub async fn validate(&mut self) -> TaxiResult<bool> {
        if !self.inner.is_bound() {
            return Ok(false);
        }
        self.inner.is_valid().await;
        check_change(&mut self.inner, &self.db, self.driver_id).await?;
        Ok(self.inner.errors().is_empty())
    }

    pub async fn save(&self) -> TaxiResult<Driver> {
        let text = |name: &str| self.inner.cleaned_str(name).unwrap_or_default().to_string();
        let changes = DriverChanges {
            username: text("username"),
            first_name: text("first_name"),
            last_name: text("last_name"),
            email: text("email"),
            is_staff: self.inner.cleaned_bool("is_staff"),
            is_superuser: self.inner.cleaned_bool("is_superuser"),
            is_active: self.inner.cleaned_bool("is_active"),
            license_number: self
                .inner
                .cleaned_str("license_number")
                .filter(|l| !l.is_empty())
                .map(String::from),
        };
        drivers::update(&self.db, self.driver_id, &changes).await
    }
}

async fn check_change(form: &mut BaseForm, db: &SqliteBackend, driver_id: i64) -> TaxiResult<()> {
    if let Some(username) = form.cleaned_str("username").map(String::from) {
        if drivers::username_exists(db, &username, Some(driver_id)).await? {
            form.add_error("username", DUPLICATE_USERNAME);
        }
    }
    check_license_unique(form, db, driver_id).await
}

#[async_trait]
impl Form for DriverChangeForm {
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
    use taxi_auth::hashers::check_password;
    use taxi_db::schema;

    async fn setup() -> SqliteBackend {
        let db = SqliteBackend::memory().unwrap();
        schema::migrate(&db).await.unwrap();
        db
    }

    fn creation_data() -> Vec<(&'static str, &'static str)> {
        vec![
            ("username", "new_user"),
            ("password1", "test123user"),
            ("password2", "test123user"),
            ("license_number", "DDD88888"),
            ("first_name", "test_first"),
            ("last_name", "test_last"),
        ]
    }

    async fn existing(db: &SqliteBackend, username: &str, license: &str) -> Driver {
        create_user(
            db,
            NewDriver {
                username: username.to_string(),
                license_number: Some(license.to_string()),
                ..NewDriver::default()
            },
            "test123user",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_creation_form_cleaned_data_equals_input() {
        let db = setup().await;
        let data = creation_data();
        let mut form = DriverCreationForm::new(db);
        form.bind(&QueryDict::from_pairs(data.clone()));
        assert!(form.is_valid().await, "{:?}", form.errors());

        let expected: HashMap<String, Value> = data
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        assert_eq!(form.cleaned_data(), &expected);
    }

    #[tokio::test]
    async fn test_creation_form_save() {
        let db = setup().await;
        let mut form = DriverCreationForm::new(db.clone());
        form.bind(&QueryDict::from_pairs(creation_data()));
        assert!(form.validate().await.unwrap());
        let driver = form.save().await.unwrap();

        assert_eq!(driver.username, "new_user");
        assert_eq!(driver.first_name, "test_first");
        assert_eq!(driver.last_name, "test_last");
        assert_eq!(driver.license_number.as_deref(), Some("DDD88888"));
        assert!(check_password("test123user", &driver.password).await.unwrap());
    }

    #[tokio::test]
    async fn test_creation_form_rejects_bad_license() {
        let db = setup().await;
        for (license, message) in [
            ("DDD8888", "license number should consist of 8 characters"),
            ("dd888888", "first 2 characters should be uppercase letters"),
            ("DD88888!", "last 6 characters should be alphanumeric"),
        ] {
            let mut data = creation_data();
            data.retain(|(k, _)| *k != "license_number");
            data.push(("license_number", license));
            let mut form = DriverCreationForm::new(db.clone());
            form.bind(&QueryDict::from_pairs(data));
            assert!(!form.is_valid().await);
            assert_eq!(form.errors()["license_number"], vec![message.to_string()]);
        }
        assert_eq!(drivers::count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_creation_form_password_mismatch() {
        let db = setup().await;
        let mut data = creation_data();
        data.retain(|(k, _)| *k != "password2");
        data.push(("password2", "different1x"));
        let mut form = DriverCreationForm::new(db);
        form.bind(&QueryDict::from_pairs(data));
        assert!(!form.is_valid().await);
        assert_eq!(form.errors()["password2"], vec![PASSWORD_MISMATCH.to_string()]);
    }

    #[tokio::test]
    async fn test_creation_form_weak_password() {
        let db = setup().await;
        let mut data = creation_data();
        data.retain(|(k, _)| !k.starts_with("password"));
        data.push(("password1", "12345678"));
        data.push(("password2", "12345678"));
        let mut form = DriverCreationForm::new(db);
        form.bind(&QueryDict::from_pairs(data));
        assert!(!form.is_valid().await);
        let errors = &form.errors()["password2"];
        assert!(errors.iter().any(|e| e.contains("too common")));
        assert!(errors.iter().any(|e| e.contains("entirely numeric")));
    }

    #[tokio::test]
    async fn test_creation_form_duplicates() {
        let db = setup().await;
        existing(&db, "new_user", "DDD88888").await;
        let mut form = DriverCreationForm::new(db);
        form.bind(&QueryDict::from_pairs(creation_data()));
        assert!(!form.is_valid().await);
        assert_eq!(form.errors()["username"], vec![DUPLICATE_USERNAME.to_string()]);
        assert_eq!(
            form.errors()["license_number"],
            vec![DUPLICATE_LICENSE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_creation_form_required_fields() {
        let db = setup().await;
        let mut form = DriverCreationForm::new(db);
        form.bind(&QueryDict::new());
        assert!(!form.is_valid().await);
        for field in ["username", "password1", "password2", "license_number"] {
            assert!(form.errors().contains_key(field), "{field}");
        }
        assert!(!form.errors().contains_key("first_name"));
    }

    #[tokio::test]
    async fn test_creation_form_renders_license_input() {
        let db = setup().await;
        let form = DriverCreationForm::new(db);
        let html = form.as_context()["license_number"]["html"]
            .as_str()
            .map(String::from)
            .unwrap_or_default();
        assert!(html.contains(r#"name="license_number""#));
    }

    #[tokio::test]
    async fn test_license_update_form() {
        let db = setup().await;
        let driver = existing(&db, "first_user", "DDD44444").await;
        existing(&db, "second_user", "DDD55555").await;

        let mut form = DriverLicenseUpdateForm::new(db.clone(), &driver);
        assert_eq!(form.as_context()["license_number"]["value"], "DDD44444");

        // Keeping the same license is not a duplicate.
        form.bind(&QueryDict::parse("license_number=DDD44444"));
        assert!(form.validate().await.unwrap());

        form.bind(&QueryDict::parse("license_number=DDD55555"));
        assert!(!form.validate().await.unwrap());
        assert_eq!(
            form.errors()["license_number"],
            vec![DUPLICATE_LICENSE.to_string()]
        );

        form.bind(&QueryDict::parse("license_number=XY000001"));
        assert!(form.is_valid().await);
        let updated = form.save().await.unwrap();
        assert_eq!(updated.license_number.as_deref(), Some("XY000001"));
    }

    #[tokio::test]
    async fn test_license_update_form_rule() {
        let db = setup().await;
        let driver = existing(&db, "first_user", "DDD44444").await;
        let mut form = DriverLicenseUpdateForm::new(db, &driver);
        form.bind(&QueryDict::parse("license_number=abc"));
        assert!(!form.is_valid().await);
        assert_eq!(
            form.errors()["license_number"],
            vec!["license number should consist of 8 characters".to_string()]
        );
    }

    #[tokio::test]
    async fn test_change_form() {
        let db = setup().await;
        let driver = existing(&db, "driver", "ABC12345").await;
        existing(&db, "other", "ABC99999").await;

        let mut form = DriverChangeForm::new(db.clone(), &driver);
        assert_eq!(form.as_context()["license_number"]["value"], "ABC12345");
        assert_eq!(form.as_context()["is_active"]["value"], "on");

        form.bind(&QueryDict::parse(
            "username=other&license_number=ABC12345&is_active=on",
        ));
        assert!(!form.validate().await.unwrap());
        assert!(form.errors().contains_key("username"));

        form.bind(&QueryDict::parse(
            "username=driver&first_name=Dan&license_number=&is_active=on&is_staff=on",
        ));
        assert!(form.validate().await.unwrap());
        let saved = form.save().await.unwrap();
        assert_eq!(saved.first_name, "Dan");
        assert!(saved.is_staff);
        assert!(saved.license_number.is_none());
    }
}
