//! # taxi-forms
//!
//! HTML forms for the taxi service. A form binds submitted data from a
//! [`QueryDict`](taxi_core::QueryDict), validates it (asynchronously, since
//! uniqueness checks hit the database), and renders itself into a template
//! context.
//!
//! ## Modules
//!
//! - [`fields`] - Field definitions and per-field cleaning
//! - [`widgets`] - HTML rendering of inputs
//! - [`bound_field`] - A field paired with its data and errors
//! - [`form`] - The [`Form`] trait and [`BaseForm`]
//! - [`validators`] - License number and username validators
//! - [`driver`] - Driver creation, license update and admin change forms
//! - [`fleet`] - Manufacturer and car forms
//! - [`search`] - The single-field search forms used by list pages
//! - [`auth`] - The login form

pub mod auth;
pub mod bound_field;
pub mod driver;
pub mod fields;
pub mod fleet;
pub mod form;
pub mod search;
pub mod validators;
pub mod widgets;

pub use form::{BaseForm, Form};
