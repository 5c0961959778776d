//! Settings for the taxi service.
//!
//! [`Settings`] holds every configurable value with sensible development
//! defaults. Use [`settings_loader`](crate::settings_loader) to layer a TOML
//! file and `TAXI_*` environment variables on top.

use serde::{Deserialize, Serialize};

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Path of the `SQLite` file, or `":memory:"`.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "taxi.sqlite3".to_string(),
        }
    }
}

/// Listen address for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// Returns `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level service settings.
///
/// # Examples
///
/// ```
/// use taxi_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.login_url, "/accounts/login/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used to sign session authentication hashes.
    pub secret_key: String,
    /// Log filter directive (e.g. "info", "taxi_views=debug").
    pub log_level: String,

    // ── Storage and server ───────────────────────────────────────────

    /// Database configuration.
    pub database: DatabaseSettings,
    /// HTTP server configuration.
    pub server: ServerSettings,

    // ── Auth ─────────────────────────────────────────────────────────

    /// Where unauthenticated visitors are redirected.
    pub login_url: String,
    /// Where a successful login lands when no `next` is given.
    pub login_redirect_url: String,
    /// Name of the session cookie.
    pub session_cookie_name: String,
    /// Session lifetime in seconds.
    pub session_cookie_age: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
            server: ServerSettings::default(),
            login_url: "/accounts/login/".to_string(),
            login_redirect_url: "/".to_string(),
            session_cookie_name: "sessionid".to_string(),
            session_cookie_age: 1_209_600,
        }
    }
}

impl Settings {
    /// Returns the problems that make these settings unfit to serve traffic.
    ///
    /// An empty list means the settings pass.
    pub fn check(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.debug && self.secret_key.is_empty() {
            problems.push("secret_key must be set when debug is false".to_string());
        }
        if self.session_cookie_name.is_empty() {
            problems.push("session_cookie_name must not be empty".to_string());
        }
        if !self.login_url.starts_with('/') {
            problems.push(format!(
                "login_url must be an absolute path, got '{}'",
                self.login_url
            ));
        }
        if self.database.path.is_empty() {
            problems.push("database.path must not be empty".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert!(settings.secret_key.is_empty());
        assert_eq!(settings.database.path, "taxi.sqlite3");
        assert_eq!(settings.server.addr(), "127.0.0.1:8000");
        assert_eq!(settings.session_cookie_name, "sessionid");
        assert_eq!(settings.session_cookie_age, 1_209_600);
    }

    #[test]
    fn test_check_passes_in_debug() {
        assert!(Settings::default().check().is_empty());
    }

    #[test]
    fn test_check_requires_secret_in_production() {
        let settings = Settings {
            debug: false,
            ..Settings::default()
        };
        let problems = settings.check();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("secret_key"));
    }

    #[test]
    fn test_check_rejects_relative_login_url() {
        let settings = Settings {
            login_url: "accounts/login/".to_string(),
            ..Settings::default()
        };
        assert!(settings.check()[0].contains("login_url"));
    }
}
