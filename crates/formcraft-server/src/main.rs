//! The `formcraft` command-line entry point.

use std::path::PathBuf;

use anyhow::Context;
use formcraft_core::logging::setup_logging;
use formcraft_core::settings_loader;
use formcraft_server::command::CommandRegistry;
use formcraft_server::commands::register_builtin_commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    setup_logging(&settings);

    registry.execute(&matches, &settings).await?;
    Ok(())
}
