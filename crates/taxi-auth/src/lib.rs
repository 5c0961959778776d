//! # taxi-auth
//!
//! Authentication for the taxi service. Drivers are the accounts.
//!
//! ## Modules
//!
//! - [`hashers`] - Argon2id/bcrypt password hashing and password validators
//! - [`users`] - Creating drivers and superusers with hashed passwords
//! - [`backend`] - Username/password authentication
//! - [`session`] - Session storage and the per-request [`Session`] handle
//! - [`session_auth`] - Logging a driver into and out of a session
//! - [`middleware`] - Axum middleware: session loading, login and staff gates

pub mod backend;
pub mod hashers;
pub mod middleware;
pub mod session;
pub mod session_auth;
pub mod users;

pub use backend::authenticate;
pub use middleware::{AuthContext, AuthState, CurrentUser};
pub use session::{InMemorySessionBackend, Session, SessionBackend, SessionData};
