//! Logging drivers into and out of a session.
//!
//! ## Session Keys
//!
//! - `_auth_user_id` - The driver's primary key, as a string
//! - `_auth_user_backend` - Which backend authenticated the driver
//! - `_auth_user_hash` - HMAC of the password hash; a password change
//!   invalidates every existing session

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use taxi_core::{TaxiError, TaxiResult};
use taxi_db::drivers;
use taxi_db::{Driver, SqliteBackend};

use crate::session::SessionData;

pub const SESSION_USER_KEY: &str = "_auth_user_id";
pub const SESSION_BACKEND_KEY: &str = "_auth_user_backend";
pub const SESSION_HASH_KEY: &str = "_auth_user_hash";

const BACKEND_NAME: &str = "taxi_auth.backend.authenticate";
const HASH_SALT: &str = "taxi_auth.session_auth.session_auth_hash";

fn auth_mac(secret_key: &str) -> TaxiResult<Hmac<Sha256>> {
    let key = format!("{HASH_SALT}:{secret_key}");
    Hmac::<Sha256>::new_from_slice(key.as_bytes())
        .map_err(|e| TaxiError::InternalServerError(format!("HMAC key error: {e}")))
}

/// Computes the session fingerprint of a password hash.
pub fn session_auth_hash(secret_key: &str, password_hash: &str) -> TaxiResult<String> {
    let mut mac = auth_mac(secret_key)?;
    mac.update(password_hash.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Compares a stored fingerprint against a password hash in constant time.
fn verify_session_auth_hash(secret_key: &str, password_hash: &str, stored: &str) -> bool {
    let Ok(expected) = STANDARD.decode(stored) else {
        return false;
    };
    let Ok(mut mac) = auth_mac(secret_key) else {
        return false;
    };
    mac.update(password_hash.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Records `driver` as the session's user.
///
/// The session key is cycled so a key known before login is useless after.
/// Logging in as a different driver drops the previous data first.
pub fn login(session: &mut SessionData, driver: &Driver, secret_key: &str) -> TaxiResult<()> {
    let hash = session_auth_hash(secret_key, &driver.password)?;
    let user_id = driver.id.to_string();

    let same_user = session
        .get(SESSION_USER_KEY)
        .and_then(|v| v.as_str())
        .is_some_and(|id| id == user_id);
    if same_user {
        session.cycle_key();
    } else {
        session.flush();
    }

    session.set(SESSION_USER_KEY, serde_json::Value::String(user_id));
    session.set(
        SESSION_BACKEND_KEY,
        serde_json::Value::String(BACKEND_NAME.to_string()),
    );
    session.set(SESSION_HASH_KEY, serde_json::Value::String(hash));
    tracing::info!(driver_id = driver.id, username = %driver.username, "logged in");
    Ok(())
}

/// Clears the session and gives it a new key.
pub fn logout(session: &mut SessionData) {
    if let Some(id) = session.get(SESSION_USER_KEY).and_then(|v| v.as_str()) {
        tracing::info!(driver_id = id, "logged out");
    }
    session.flush();
}

/// Returns the driver id recorded in the session, without checking it.
pub fn session_user_id(session: &SessionData) -> Option<i64> {
    session
        .get(SESSION_USER_KEY)
        .and_then(|v| v.as_str())
        .and_then(|id| id.parse().ok())
}

/// Loads the session's driver.
///
/// Returns `None` when nobody is logged in, the driver no longer exists or
/// is inactive, or the password changed since login. In the last two cases
/// the session is flushed.
pub async fn get_user(
    db: &SqliteBackend,
    session: &mut SessionData,
    secret_key: &str,
) -> TaxiResult<Option<Driver>> {
    let Some(user_id) = session_user_id(session) else {
        return Ok(None);
    };

    let driver = match drivers::get(db, user_id).await {
        Ok(driver) => driver,
        Err(TaxiError::DoesNotExist(_)) => {
            session.flush();
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let hash_ok = session
        .get(SESSION_HASH_KEY)
        .and_then(|v| v.as_str())
        .is_some_and(|stored| verify_session_auth_hash(secret_key, &driver.password, stored));

    if !hash_ok || !driver.is_active {
        tracing::debug!(driver_id = driver.id, "session no longer valid");
        session.flush();
        return Ok(None);
    }

    Ok(Some(driver))
}
