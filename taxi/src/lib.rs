//! # taxi
//!
//! Record management for a taxi fleet: manufacturers, the cars they build,
//! and the drivers assigned to those cars. Server-rendered pages behind a
//! login, plus a staff admin.
//!
//! This crate re-exports the workspace crates and provides the `taxi`
//! binary.

/// Errors, settings, logging and query string parsing.
pub use taxi_core as core;

/// `SQLite` storage and the models.
pub use taxi_db as db;

/// HTML forms and validation.
pub use taxi_forms as forms;

/// Password hashing, sessions and the login gate.
pub use taxi_auth as auth;

/// The staff admin.
pub use taxi_admin as admin;

/// Pages, routing and the server.
pub use taxi_views as views;

/// Management commands.
pub use taxi_cli as cli;

/// Test client and in-memory app.
#[cfg(feature = "testing")]
pub use taxi_test as test;
