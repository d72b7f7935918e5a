//! CLI command definitions and dispatch for the `fooorum` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod auth;
pub mod chat;
pub mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Log in to the forum and join the live chat from your terminal.
#[derive(Parser)]
#[command(name = "fooorum", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Base URL of the auth service (overrides config.toml).
    #[arg(long, global = true, env = "FOOORUM_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Base URL of the forum service (overrides config.toml).
    #[arg(long, global = true, env = "FOOORUM_FORUM_URL")]
    pub forum_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password.
    Login {
        /// Account email (prompted if omitted).
        #[arg(long)]
        email: Option<String>,

        /// Account password (prompted with hidden input if omitted).
        #[arg(long, env = "FOOORUM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account and log in.
    Register {
        /// Account email (prompted if omitted).
        #[arg(long)]
        email: Option<String>,

        /// Display name (prompted if omitted).
        #[arg(long)]
        username: Option<String>,

        /// Account password (prompted with hidden input if omitted).
        #[arg(long, env = "FOOORUM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored token.
    Logout,

    /// Show the signed-in user.
    #[command(alias = "me")]
    Whoami,

    /// Join the live chat room.
    Chat,

    /// Show the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["fooorum", "whoami", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn login_accepts_email_flag() {
        let cli =
            Cli::try_parse_from(["fooorum", "login", "--email", "a@example.com"]).unwrap();
        match cli.command {
            Commands::Login { email, .. } => assert_eq!(email.as_deref(), Some("a@example.com")),
            _ => panic!("expected login"),
        }
    }
}
