//! # taxi-cli
//!
//! Management commands for the taxi service, dispatched by the `taxi`
//! binary.
//!
//! ```rust
//! use taxi_cli::command::CommandRegistry;
//! use taxi_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//! assert_eq!(
//!     registry.list_commands(),
//!     vec!["check", "createsuperuser", "migrate", "runserver"]
//! );
//! ```
//!
//! ## Modules
//!
//! - [`command`] - The [`ManagementCommand`] trait and [`CommandRegistry`]
//! - [`commands`] - `runserver`, `migrate`, `createsuperuser`, `check`

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
