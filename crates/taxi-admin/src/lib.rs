//! # taxi-admin
//!
//! The staff admin for the taxi service. Models are registered on an
//! [`AdminSite`] with a [`ModelAdmin`] each; the site then serves
//! server-rendered changelists, add/change forms and delete confirmations
//! under `/admin/`, visible to active staff only.
//!
//! ## Modules
//!
//! - [`model_admin`] - Per-model configuration
//! - [`registrations`] - Manufacturer, car and driver registrations
//! - [`site`] - The registry and router
//! - [`db`] - Generic object access over the repositories
//! - [`filters`] - Changelist filter sidebar
//! - [`forms`] - Add and change forms per model
//! - [`templates`] - Embedded tera templates
//! - [`views`] - Page handlers

pub mod db;
pub mod filters;
pub mod forms;
pub mod model_admin;
pub mod registrations;
pub mod site;
pub mod templates;
pub mod views;

pub use model_admin::ModelAdmin;
pub use registrations::register_taxi_models;
pub use site::AdminSite;
