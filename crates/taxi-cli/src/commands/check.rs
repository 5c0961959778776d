//! The `check` command.

use async_trait::async_trait;
use taxi_core::{Settings, TaxiError};

use crate::command::ManagementCommand;

/// Validates the settings and reports problems.
pub struct CheckCommand;

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the settings for problems"
    }

    async fn handle(
        &self,
        _matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), TaxiError> {
        let problems = settings.check();
        if problems.is_empty() {
            println!("System check identified no issues (0 silenced).");
            return Ok(());
        }
        for problem in &problems {
            eprintln!("ERROR: {problem}");
        }
        Err(TaxiError::ConfigurationError(format!(
            "System check identified {} issue(s)",
            problems.len()
        )))
    }
}
