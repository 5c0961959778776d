//! Driver (account) queries.
//!
//! Passwords arrive here already encoded; hashing lives in `taxi-auth`.

use chrono::Utc;
use taxi_core::TaxiResult;

use crate::lookups::{non_empty, Conditions};
use crate::model::{self, does_not_exist, format_timestamp, Model};
use crate::models::{Driver, NewDriver};
use crate::sqlite::SqliteBackend;

/// Narrows the driver list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverFilter {
    /// Case-insensitive substring of `username`.
    pub username: Option<String>,
    /// Case-insensitive substring of username, first name, last name or email.
    pub search: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

impl DriverFilter {
    /// Columns covered by [`DriverFilter::search`].
    pub const SEARCH_COLUMNS: [&'static str; 4] = ["username", "first_name", "last_name", "email"];

    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        if let Some(username) = non_empty(self.username.as_deref()) {
            conditions.icontains("username", username);
        }
        if let Some(term) = non_empty(self.search.as_deref()) {
            conditions.icontains_any(&Self::SEARCH_COLUMNS, term);
        }
        for (column, value) in [
            ("is_staff", self.is_staff),
            ("is_superuser", self.is_superuser),
            ("is_active", self.is_active),
        ] {
            if let Some(value) = value {
                conditions.exact(column, value);
            }
        }
        conditions
    }
}

/// Fields an administrator may change on an existing driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverChanges {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub license_number: Option<String>,
}

impl From<&Driver> for DriverChanges {
    fn from(driver: &Driver) -> Self {
        Self {
            username: driver.username.clone(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            email: driver.email.clone(),
            is_staff: driver.is_staff,
            is_superuser: driver.is_superuser,
            is_active: driver.is_active,
            license_number: driver.license_number.clone(),
        }
    }
}

/// Lists drivers ordered by username.
pub async fn list(db: &SqliteBackend, filter: &DriverFilter) -> TaxiResult<Vec<Driver>> {
    model::fetch_all(db, filter.conditions()).await
}

/// Fetches one driver.
pub async fn get(db: &SqliteBackend, id: i64) -> TaxiResult<Driver> {
    model::fetch_one(db, id).await
}

/// Fetches a driver by exact username.
pub async fn get_by_username(db: &SqliteBackend, username: &str) -> TaxiResult<Option<Driver>> {
    let mut conditions = Conditions::new();
    conditions.exact("username", username.to_string());
    Ok(model::fetch_all::<Driver>(db, conditions).await?.into_iter().next())
}

/// Inserts a driver. The license number is stored exactly as given.
pub async fn insert(db: &SqliteBackend, new: &NewDriver) -> TaxiResult<Driver> {
    let new_owned = new.clone();
    let joined = format_timestamp(&Utc::now());
    let id = db
        .run(move |conn| {
            conn.execute(
                "INSERT INTO taxi_driver (username, password, first_name, last_name, email, \
                 is_staff, is_superuser, is_active, date_joined, license_number) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)",
                rusqlite::params![
                    new_owned.username,
                    new_owned.password,
                    new_owned.first_name,
                    new_owned.last_name,
                    new_owned.email,
                    new_owned.is_staff,
                    new_owned.is_superuser,
                    joined,
                    new_owned.license_number,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await?;
    tracing::info!(id, username = %new.username, "created driver");
    get(db, id).await
}

/// Sets a driver's license number.
pub async fn update_license(db: &SqliteBackend, id: i64, license_number: &str) -> TaxiResult<Driver> {
    let license = license_number.to_string();
    let affected = db
        .run(move |conn| {
            conn.execute(
                "UPDATE taxi_driver SET license_number = ?1 WHERE id = ?2",
                rusqlite::params![license, id],
            )
        })
        .await?;
    if affected == 0 {
        return Err(does_not_exist::<Driver>(id));
    }
    tracing::info!(id, "updated driver license number");
    get(db, id).await
}

/// Applies administrator changes to a driver.
pub async fn update(db: &SqliteBackend, id: i64, changes: &DriverChanges) -> TaxiResult<Driver> {
    let c = changes.clone();
    let affected = db
        .run(move |conn| {
            conn.execute(
                "UPDATE taxi_driver SET username = ?1, first_name = ?2, last_name = ?3, \
                 email = ?4, is_staff = ?5, is_superuser = ?6, is_active = ?7, \
                 license_number = ?8 WHERE id = ?9",
                rusqlite::params![
                    c.username,
                    c.first_name,
                    c.last_name,
                    c.email,
                    c.is_staff,
                    c.is_superuser,
                    c.is_active,
                    c.license_number,
                    id,
                ],
            )
        })
        .await?;
    if affected == 0 {
        return Err(does_not_exist::<Driver>(id));
    }
    tracing::info!(id, "updated driver");
    get(db, id).await
}

/// Stores a new encoded password.
pub async fn set_password(db: &SqliteBackend, id: i64, encoded: &str) -> TaxiResult<()> {
    let encoded = encoded.to_string();
    let affected = db
        .run(move |conn| {
            conn.execute(
                "UPDATE taxi_driver SET password = ?1 WHERE id = ?2",
                rusqlite::params![encoded, id],
            )
        })
        .await?;
    if affected == 0 {
        return Err(does_not_exist::<Driver>(id));
    }
    Ok(())
}

/// Records a successful login.
pub async fn touch_last_login(db: &SqliteBackend, id: i64) -> TaxiResult<()> {
    let now = format_timestamp(&Utc::now());
    db.run(move |conn| {
        conn.execute(
            "UPDATE taxi_driver SET last_login = ?1 WHERE id = ?2",
            rusqlite::params![now, id],
        )
    })
    .await?;
    Ok(())
}

/// Deletes a driver and their car assignments.
pub async fn delete(db: &SqliteBackend, id: i64) -> TaxiResult<()> {
    model::delete::<Driver>(db, id).await
}

/// Counts all drivers.
pub async fn count(db: &SqliteBackend) -> TaxiResult<i64> {
    model::count::<Driver>(db).await
}

/// Returns `true` if another driver already uses `username`.
pub async fn username_exists(db: &SqliteBackend, username: &str, exclude: Option<i64>) -> TaxiResult<bool> {
    unique_taken(db, "username", username, exclude).await
}

/// Returns `true` if another driver already holds `license_number`.
pub async fn license_exists(
    db: &SqliteBackend,
    license_number: &str,
    exclude: Option<i64>,
) -> TaxiResult<bool> {
    unique_taken(db, "license_number", license_number, exclude).await
}

async fn unique_taken(
    db: &SqliteBackend,
    column: &str,
    value: &str,
    exclude: Option<i64>,
) -> TaxiResult<bool> {
    let mut conditions = Conditions::new();
    conditions.exact(column, value.to_string());
    if let Some(id) = exclude {
        conditions.not_equal(Driver::pk_column(), id);
    }
    model::exists::<Driver>(db, conditions).await
}
