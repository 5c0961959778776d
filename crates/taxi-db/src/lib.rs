//! # taxi-db
//!
//! Storage for the taxi service: the [`Manufacturer`], [`Car`] and [`Driver`]
//! models, an async wrapper around a single `SQLite` connection, the schema,
//! and per-model query modules.
//!
//! ## Modules
//!
//! - [`sqlite`] - [`SqliteBackend`], blocking `rusqlite` calls moved off the runtime
//! - [`schema`] - Table definitions and [`schema::migrate`]
//! - [`model`] - The [`Model`] trait and generic fetch/count/delete helpers
//! - [`lookups`] - WHERE-clause building (`exact`, `icontains`)
//! - [`models`] - Model structs
//! - [`manufacturers`], [`cars`], [`drivers`] - Per-model queries

pub mod cars;
pub mod drivers;
pub mod lookups;
pub mod manufacturers;
pub mod model;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use model::Model;
pub use models::{Car, Driver, Manufacturer, NewDriver};
pub use sqlite::SqliteBackend;
