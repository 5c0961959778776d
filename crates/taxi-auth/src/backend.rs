//! Username/password authentication against the driver table.

use taxi_core::TaxiResult;
use taxi_db::drivers;
use taxi_db::{Driver, SqliteBackend};

use crate::hashers::{check_password, make_password, must_update_password};

/// Returns the driver when `username` exists, is active and `password`
/// matches. Stale hashes are upgraded to Argon2id on success.
///
/// A wrong password and an unknown username both give `Ok(None)`.
pub async fn authenticate(
    db: &SqliteBackend,
    username: &str,
    password: &str,
) -> TaxiResult<Option<Driver>> {
    let Some(mut driver) = drivers::get_by_username(db, username).await? else {
        // Hash anyway so unknown usernames take as long as wrong passwords.
        make_password(password).await?;
        tracing::debug!(username, "login failed: unknown username");
        return Ok(None);
    };

    if !driver.is_active {
        tracing::debug!(username, "login failed: inactive account");
        return Ok(None);
    }

    if !check_password(password, &driver.password).await? {
        tracing::debug!(username, "login failed: bad password");
        return Ok(None);
    }

    if must_update_password(&driver.password) {
        let encoded = make_password(password).await?;
        drivers::set_password(db, driver.id, &encoded).await?;
        driver.password = encoded;
    }

    Ok(Some(driver))
}
