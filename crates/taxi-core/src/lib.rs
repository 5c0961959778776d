//! # taxi-core
//!
//! Core types, settings and error types for the taxi service.
//! This crate has no dependency on any other taxi crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Service settings with defaults
//! - [`settings_loader`] - TOML and environment loading of settings
//! - [`logging`] - Tracing-based logging integration
//! - [`querydict`] - Multi-valued query string and form body parsing

pub mod error;
pub mod logging;
pub mod querydict;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{TaxiError, TaxiResult, ValidationError};
pub use querydict::QueryDict;
pub use settings::Settings;
