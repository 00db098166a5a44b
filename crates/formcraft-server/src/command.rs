//! Management command framework for the `formcraft` binary.
//!
//! Each subcommand implements [`ManagementCommand`] and is registered in a
//! [`CommandRegistry`], which builds the clap CLI and dispatches to the
//! matching command.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use formcraft_core::{FormcraftResult, Settings};
//! use formcraft_server::command::ManagementCommand;
//!
//! struct GreetCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for GreetCommand {
//!     fn name(&self) -> &'static str { "greet" }
//!     fn help(&self) -> &'static str { "Say hello" }
//!
//!     async fn handle(&self, _matches: &clap::ArgMatches, _settings: &Settings) -> FormcraftResult<()> {
//!         println!("Hello from formcraft!");
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use formcraft_core::{FormcraftError, FormcraftResult, Settings};

/// A subcommand of the `formcraft` binary.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// The subcommand name.
    fn name(&self) -> &'static str;

    /// A one-line description.
    fn help(&self) -> &'static str;

    /// Adds arguments to the clap subcommand. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormcraftResult<()>;
}

/// Registered commands, keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, replacing any with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Returns the command called `name`.
    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered names, sorted.
    pub fn list_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap command with every registered subcommand and
    /// the global `--config <path>` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("formcraft")
            .about("formcraft form builder")
            .subcommand_required(true)
            .arg(
                clap::Arg::new("config")
                    .long("config")
                    .global(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Path to a TOML settings file"),
            );

        for name in self.list_commands() {
            if let Some(cmd) = self.get(name) {
                let sub = clap::Command::new(name).about(cmd.help());
                app = app.subcommand(cmd.add_arguments(sub));
            }
        }
        app
    }

    /// Dispatches to the subcommand named in `matches`.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormcraftResult<()> {
        let (name, sub_matches) = matches.subcommand().ok_or_else(|| {
            FormcraftError::ConfigurationError("No subcommand specified".to_string())
        })?;
        let cmd = self
            .get(name)
            .ok_or_else(|| FormcraftError::ConfigurationError(format!("Unknown command: {name}")))?;
        tracing::debug!(command = name, "running command");
        cmd.handle(sub_matches, settings).await
    }
}
