//! Creating drivers with hashed passwords.
//!
//! Storage only ever sees encoded passwords; these helpers are the one place
//! raw passwords are turned into hashes before reaching `taxi_db`.

use taxi_core::{TaxiError, TaxiResult};
use taxi_db::drivers;
use taxi_db::{Driver, NewDriver, SqliteBackend};

use crate::hashers::{make_password, make_unusable_password};

/// Hashes `raw_password` and inserts the driver.
///
/// `new.password` is ignored. An empty raw password gives an account that
/// cannot log in.
pub async fn create_user(
    db: &SqliteBackend,
    mut new: NewDriver,
    raw_password: &str,
) -> TaxiResult<Driver> {
    if new.username.is_empty() {
        return Err(TaxiError::BadRequest("The given username must be set".to_string()));
    }
    new.password = if raw_password.is_empty() {
        make_unusable_password()
    } else {
        make_password(raw_password).await?
    };
    drivers::insert(db, &new).await
}

/// Creates a staff superuser. Superusers need no license number.
pub async fn create_superuser(
    db: &SqliteBackend,
    username: &str,
    email: &str,
    raw_password: &str,
) -> TaxiResult<Driver> {
    let new = NewDriver {
        username: username.to_string(),
        email: email.to_string(),
        is_staff: true,
        is_superuser: true,
        ..NewDriver::default()
    };
    create_user(db, new, raw_password).await
}

/// Hashes and stores a new password for an existing driver.
pub async fn set_password(db: &SqliteBackend, driver_id: i64, raw_password: &str) -> TaxiResult<()> {
    let encoded = make_password(raw_password).await?;
    drivers::set_password(db, driver_id, &encoded).await?;
    tracing::info!(driver_id, "password changed");
    Ok(())
}
