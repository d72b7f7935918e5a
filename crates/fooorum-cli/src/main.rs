//! Fooorum command-line client entry point.
//!
//! Binary name: `fooorum`
//!
//! Parses CLI arguments, sets up tracing, restores the persisted session,
//! then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use fooorum_observe::{Verbosity, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(Verbosity::from_flags(cli.quiet, cli.verbose), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "fooorum", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.auth_url.clone(), cli.forum_url.clone()).await?;

    let result = match cli.command {
        Commands::Login { email, password } => {
            cli::auth::login(&state, email, password, cli.json).await
        }
        Commands::Register {
            email,
            username,
            password,
        } => cli::auth::register(&state, email, username, password, cli.json).await,
        Commands::Logout => cli::auth::logout(&state, cli.json).await,
        Commands::Whoami => cli::auth::whoami(&state, cli.json),
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state, cli.json).await,
        Commands::Config => cli::config::show_config(&state, cli.json),
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
