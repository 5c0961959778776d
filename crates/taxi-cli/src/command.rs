//! Management command framework.
//!
//! A [`ManagementCommand`] names itself, declares its clap arguments and
//! handles a parsed invocation. The [`CommandRegistry`] builds the top-level
//! clap command from every registration and dispatches to the chosen one.
//!
//! ## Defining a Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use taxi_cli::command::ManagementCommand;
//! use taxi_core::{Settings, TaxiError};
//!
//! struct GreetCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &'static str { "greet" }
//!     fn help(&self) -> &'static str { "Say hello" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!     ) -> Result<(), TaxiError> {
//!         println!("Hello from the taxi service!");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use taxi_core::{Settings, TaxiError};

/// Name of the global option pointing at a TOML settings file.
pub const SETTINGS_ARG: &str = "settings";

/// A command run from the `taxi` binary.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    fn name(&self) -> &'static str;

    fn help(&self) -> &'static str;

    /// Adds the command's own arguments. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings)
        -> Result<(), TaxiError>;
}

/// Registered commands by name.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.list_commands())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Sorted command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the `taxi` clap command with one subcommand per registration
    /// and the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("taxi")
            .about("Taxi service management utility")
            .subcommand_required(true)
            .arg(
                clap::Arg::new(SETTINGS_ARG)
                    .long(SETTINGS_ARG)
                    .global(true)
                    .value_name("PATH")
                    .help("TOML settings file"),
            );

        for name in self.list_commands() {
            if let Some(cmd) = self.get(name) {
                let subcmd = clap::Command::new(cmd.name()).about(cmd.help());
                app = app.subcommand(cmd.add_arguments(subcmd));
            }
        }
        app
    }

    /// Runs the subcommand chosen in `matches`.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), TaxiError> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            TaxiError::ConfigurationError("No subcommand specified".to_string())
        })?;

        let cmd = self
            .get(name)
            .ok_or_else(|| TaxiError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "running management command");
        cmd.handle(sub_matches, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingCommand;

    #[async_trait]
    impl ManagementCommand for FailingCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn help(&self) -> &'static str {
            "A command that always fails"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(
                clap::Arg::new("verbose")
                    .long("verbose")
                    .action(clap::ArgAction::SetTrue),
            )
        }

        async fn handle(
            &self,
            _matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), TaxiError> {
            Err(TaxiError::ConfigurationError("deliberate failure".to_string()))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(FailingCommand));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("fail").unwrap().help(), "A command that always fails");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_build_cli_parses_global_settings() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(FailingCommand));
        let matches = registry
            .build_cli()
            .try_get_matches_from(["taxi", "fail", "--verbose", "--settings", "taxi.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>(SETTINGS_ARG).map(String::as_str),
            Some("taxi.toml")
        );
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "fail");
        assert!(sub.get_flag("verbose"));
    }

    #[test]
    fn test_subcommand_required() {
        let registry = CommandRegistry::new();
        assert!(registry.build_cli().try_get_matches_from(["taxi"]).is_err());
    }

    #[tokio::test]
    async fn test_execute_dispatches() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(FailingCommand));
        let matches = registry
            .build_cli()
            .try_get_matches_from(["taxi", "fail"])
            .unwrap();
        let err = registry
            .execute(&matches, &Settings::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deliberate failure"));
    }
}
