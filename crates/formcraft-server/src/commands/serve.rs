//! The `serve` command.

use async_trait::async_trait;
use formcraft_core::{FormcraftResult, Settings};
use formcraft_store::InMemoryFormStore;

use crate::command::ManagementCommand;
use crate::router;
use crate::state::AppState;

/// Starts the HTTP server. `--host` and `--port` override the settings.
pub struct ServeCommand;

#[async_trait]
impl ManagementCommand for ServeCommand {
    fn name(&self) -> &'static str {
        "serve"
    }

    fn help(&self) -> &'static str {
        "Starts the HTTP server"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(clap::Arg::new("host").long("host").help("Host to bind to"))
            .arg(
                clap::Arg::new("port")
                    .long("port")
                    .value_parser(clap::value_parser!(u16))
                    .help("Port to bind to"),
            )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormcraftResult<()> {
        let mut settings = settings.clone();
        if let Some(host) = matches.get_one::<String>("host") {
            settings.host.clone_from(host);
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            settings.port = *port;
        }

        let addr = settings.bind_address();
        tracing::info!(debug = settings.debug, "starting formcraft at http://{addr}/");
        let state = AppState::new(settings, InMemoryFormStore::new())?;
        router::serve(state, &addr).await
    }
}
