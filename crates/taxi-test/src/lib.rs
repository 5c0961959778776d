//! # taxi-test
//!
//! Test tooling for the taxi service.
//!
//! ## Modules
//!
//! - [`client`] - [`TestClient`] and [`TestResponse`]
//! - [`app`] - [`TestApp`], the full service over an in-memory database

pub mod app;
pub mod client;

pub use app::{TestApp, TEST_PASSWORD};
pub use client::{TestClient, TestResponse};
