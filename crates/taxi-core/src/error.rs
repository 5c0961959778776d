//! Core error types for the taxi service.
//!
//! [`TaxiError`] covers HTTP errors, storage errors, validation errors,
//! configuration errors and template errors. Every variant maps to an HTTP
//! status code via [`TaxiError::status_code`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation error with optional field-level errors.
///
/// A simple error carries one message. A compound error carries per-field
/// message lists, keyed by field name (`"__all__"` for form-level errors).
///
/// # Examples
///
/// ```
/// use taxi_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.to_string(), "This field is required.");
///
/// let mut field_errors = std::collections::HashMap::new();
/// field_errors.insert(
///     "license_number".to_string(),
///     vec!["license number should consist of 8 characters".to_string()],
/// );
/// let err = ValidationError::with_field_errors(field_errors);
/// assert!(err.to_string().contains("license_number"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "invalid").
    pub code: String,
    /// Per-field error messages, keyed by field name.
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            message: String::new(),
            code: "invalid".to_string(),
            field_errors,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.message);
        }
        let mut fields: Vec<_> = self.field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let mut first = true;
        for (field, errors) in fields {
            for error in errors {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the taxi service.
#[derive(Error, Debug)]
pub enum TaxiError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 401 Unauthorized.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 403 Forbidden.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Storage errors ───────────────────────────────────────────────

    /// A lookup expected exactly one row but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A UNIQUE or FOREIGN KEY constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// The database could not be opened or the blocking task failed.
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// One or more fields failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Templates ────────────────────────────────────────────────────

    /// A template failed to parse or render.
    #[error("Template error: {0}")]
    TemplateError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TaxiError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `ValidationError` -> 400
    /// - `Unauthorized` -> 401
    /// - `PermissionDenied` -> 403
    /// - `NotFound`, `DoesNotExist` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::PermissionDenied(_) => 403,
            Self::NotFound(_) | Self::DoesNotExist(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::InternalServerError(_)
            | Self::DatabaseError(_)
            | Self::IntegrityError(_)
            | Self::OperationalError(_)
            | Self::ConfigurationError(_)
            | Self::TemplateError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for errors that are the client's fault (4xx).
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<ValidationError> for TaxiError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl From<serde_json::Error> for TaxiError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, TaxiError>`.
pub type TaxiResult<T> = Result<T, TaxiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_validation_error_display_field_errors_sorted() {
        let mut field_errors = HashMap::new();
        field_errors.insert("username".to_string(), vec!["Taken.".to_string()]);
        field_errors.insert("license_number".to_string(), vec!["Bad.".to_string()]);
        let err = ValidationError::with_field_errors(field_errors);
        assert_eq!(err.to_string(), "license_number: Bad.; username: Taken.");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TaxiError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(TaxiError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(TaxiError::PermissionDenied("x".into()).status_code(), 403);
        assert_eq!(TaxiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(TaxiError::DoesNotExist("x".into()).status_code(), 404);
        assert_eq!(TaxiError::MethodNotAllowed("x".into()).status_code(), 405);
        assert_eq!(TaxiError::DatabaseError("x".into()).status_code(), 500);
        assert_eq!(TaxiError::IntegrityError("x".into()).status_code(), 500);
        assert_eq!(TaxiError::TemplateError("x".into()).status_code(), 500);
        assert_eq!(
            TaxiError::ValidationError(ValidationError::new("x", "y")).status_code(),
            400
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(TaxiError::NotFound("car".into()).is_client_error());
        assert!(!TaxiError::DatabaseError("locked".into()).is_client_error());
    }

    #[test]
    fn test_display() {
        let err = TaxiError::NotFound("car 7".into());
        assert_eq!(err.to_string(), "Not found: car 7");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TaxiError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }
}
