//! The `createsuperuser` command.

use async_trait::async_trait;
use taxi_auth::hashers::validate_password;
use taxi_auth::users::create_superuser;
use taxi_core::{Settings, TaxiError, ValidationError};
use taxi_db::{drivers, SqliteBackend};

use super::open_migrated;
use crate::command::ManagementCommand;

/// Creates an active staff superuser. Non-interactive.
pub struct CreatesuperuserCommand;

impl CreatesuperuserCommand {
    /// Validates and creates the account in `db`.
    pub async fn create(
        db: &SqliteBackend,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), TaxiError> {
        if drivers::username_exists(db, username, None).await? {
            return Err(TaxiError::ValidationError(ValidationError::new(
                "Error: That username is already taken.",
                "unique",
            )));
        }
        if let Err(errors) = validate_password(password) {
            return Err(TaxiError::ValidationError(ValidationError::new(
                errors.join(" "),
                "password",
            )));
        }
        let driver = create_superuser(db, username, email, password).await?;
        tracing::info!(id = driver.id, username = %driver.username, "Superuser created successfully.");
        Ok(())
    }
}

#[async_trait]
impl ManagementCommand for CreatesuperuserCommand {
    fn name(&self) -> &'static str {
        "createsuperuser"
    }

    fn help(&self) -> &'static str {
        "Create a superuser account"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("username")
                .long("username")
                .required(true)
                .help("Username for the superuser"),
        )
        .arg(
            clap::Arg::new("email")
                .long("email")
                .default_value("")
                .help("Email address for the superuser"),
        )
        .arg(
            clap::Arg::new("password")
                .long("password")
                .required(true)
                .help("Password for the superuser"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), TaxiError> {
        let arg = |name: &str| {
            matches
                .get_one::<String>(name)
                .map_or("", String::as_str)
                .to_string()
        };
        let db = open_migrated(settings).await?;
        Self::create(&db, &arg("username"), &arg("email"), &arg("password")).await
    }
}
