//! Built-in management commands.

pub mod check;
pub mod createsuperuser;
pub mod migrate;
pub mod runserver;

pub use check::CheckCommand;
pub use createsuperuser::CreatesuperuserCommand;
pub use migrate::MigrateCommand;
pub use runserver::RunserverCommand;

use taxi_core::{Settings, TaxiResult};
use taxi_db::{schema, SqliteBackend};

use crate::command::CommandRegistry;

/// Registers every built-in command.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(RunserverCommand));
    registry.register(Box::new(MigrateCommand));
    registry.register(Box::new(CreatesuperuserCommand));
    registry.register(Box::new(CheckCommand));
}

/// Opens the configured database and brings its schema up to date.
pub async fn open_migrated(settings: &Settings) -> TaxiResult<SqliteBackend> {
    let db = SqliteBackend::open(&settings.database.path)?;
    schema::migrate(&db).await?;
    Ok(db)
}
