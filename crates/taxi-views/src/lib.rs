//! # taxi-views
//!
//! The taxi service's pages: manufacturer, car and driver lists with search,
//! detail pages, create/update/delete forms, the driver-to-car assignment
//! toggle, and login/logout. [`server::TaxiApp`] assembles them with the
//! admin site into a single axum router.
//!
//! ## Modules
//!
//! - [`server`] - [`TaxiApp`](server::TaxiApp) and the route table
//! - [`views`] - Page handlers
//! - [`state`] - [`AppState`](state::AppState) shared by handlers
//! - [`templates`] - Embedded tera templates and rendering
//! - [`error`] - Error pages

pub mod error;
pub mod server;
pub mod state;
pub mod templates;
pub mod views;

pub use server::{build_router, TaxiApp};
pub use state::AppState;
pub use templates::TemplateContext;
