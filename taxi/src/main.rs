//! The `taxi` management binary.
//!
//! ```text
//! taxi [--settings taxi.toml] runserver [--host H] [--port P]
//! taxi migrate
//! taxi createsuperuser --username U --password P [--email E]
//! taxi check
//! ```
//!
//! Settings load as defaults, then the `--settings` file, then `TAXI_*`
//! environment variables.

use anyhow::Context;

use taxi_cli::command::{CommandRegistry, SETTINGS_ARG};
use taxi_cli::commands::register_builtin_commands;
use taxi_core::logging::setup_logging;
use taxi_core::settings_loader;
use taxi_core::Settings;

fn load_settings(path: Option<&String>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading settings from {path}")),
        None => Ok(settings_loader::from_env()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();
    let settings = load_settings(matches.get_one::<String>(SETTINGS_ARG))?;
    setup_logging(&settings);

    let command = matches.subcommand_name().unwrap_or_default().to_string();
    registry
        .execute(&matches, &settings)
        .await
        .with_context(|| format!("{command} failed"))?;
    Ok(())
}
