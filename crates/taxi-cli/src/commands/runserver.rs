//! The `runserver` command.

use async_trait::async_trait;
use taxi_core::{Settings, TaxiError};
use taxi_views::TaxiApp;

use super::open_migrated;
use crate::command::ManagementCommand;

/// Migrates the database, then serves the site.
///
/// `--host` and `--port` override the `server` settings.
pub struct RunserverCommand;

impl RunserverCommand {
    /// The address to bind, from the arguments or the settings.
    pub fn addr(matches: &clap::ArgMatches, settings: &Settings) -> String {
        let host = matches
            .get_one::<String>("host")
            .map_or(settings.server.host.as_str(), String::as_str);
        let port = matches
            .get_one::<u16>("port")
            .copied()
            .unwrap_or(settings.server.port);
        format!("{host}:{port}")
    }
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Starts the development server"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .help("Host to bind to"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), TaxiError> {
        let addr = Self::addr(matches, settings);
        for problem in settings.check() {
            tracing::warn!("{problem}");
        }
        let db = open_migrated(settings).await?;
        TaxiApp::new(settings.clone(), db).run(&addr).await
    }
}
