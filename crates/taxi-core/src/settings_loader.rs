//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TAXI_SECRET_KEY` | `secret_key` |
//! | `TAXI_DEBUG` | `debug` |
//! | `TAXI_LOG_LEVEL` | `log_level` |
//! | `TAXI_DATABASE_PATH` | `database.path` |
//! | `TAXI_HOST` | `server.host` |
//! | `TAXI_PORT` | `server.port` |
//! | `TAXI_SESSION_COOKIE_NAME` | `session_cookie_name` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use taxi_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("taxi.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::TaxiError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values, including keys of
/// nested tables such as `[server]`.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, TaxiError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| TaxiError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let json_value = toml_to_json(toml_value);
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        TaxiError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, json_value);
    serde_json::from_value(merged).map_err(|e| {
        TaxiError::ConfigurationError(format!("Failed to deserialize settings from TOML: {e}"))
    })
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, TaxiError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        TaxiError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, TaxiError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from environment variables only (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `TAXI_*` environment variable overrides to a settings struct.
///
/// `TAXI_DEBUG` accepts "true", "1" or "yes" as true; anything else is false.
/// An unparsable `TAXI_PORT` is ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("TAXI_SECRET_KEY") {
        settings.secret_key = val;
    }

    if let Ok(val) = std::env::var("TAXI_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("TAXI_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("TAXI_DATABASE_PATH") {
        settings.database.path = val;
    }

    if let Ok(val) = std::env::var("TAXI_HOST") {
        settings.server.host = val;
    }

    if let Ok(val) = std::env::var("TAXI_PORT") {
        if let Ok(port) = val.parse::<u16>() {
            settings.server.port = port;
        }
    }

    if let Ok(val) = std::env::var("TAXI_SESSION_COOKIE_NAME") {
        settings.session_cookie_name = val;
    }
}

// ============================================================
// Helpers
// ============================================================

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
