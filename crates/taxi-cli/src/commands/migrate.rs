//! The `migrate` command.

use async_trait::async_trait;
use taxi_core::{Settings, TaxiError};

use super::open_migrated;
use crate::command::ManagementCommand;

/// Creates the taxi tables in the configured database if they are missing.
pub struct MigrateCommand;

#[async_trait]
impl ManagementCommand for MigrateCommand {
    fn name(&self) -> &'static str {
        "migrate"
    }

    fn help(&self) -> &'static str {
        "Create the database schema"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), TaxiError> {
        open_migrated(settings).await?;
        tracing::info!(path = %settings.database.path, "database schema is up to date");
        Ok(())
    }
}
