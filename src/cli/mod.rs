//! # Command Line Interface
//!
//! Parses the invocation once into [`Cli`], sets up logging and dispatches
//! to the frontend or configuration commands. Nothing here is global: the
//! parsed flags and resolved client configuration are passed down by reference.

pub mod config;
pub mod config_cmd;
pub mod frontends;
pub mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::registry::{ClientConfig, RobinClient};
use crate::Error;

#[derive(Parser, Debug)]
#[command(name = crate::APP_NAME)]
#[command(about = "Control a Robin load-balancer")]
#[command(version = crate::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// URL of the Robin API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Frontend(frontends::FrontendCommands),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            initialise_logging(false, false);
            return Err(usage_error(&e).into());
        }
    };

    initialise_logging(cli.verbose, cli.quiet);

    run(cli).await
}

/// The clap command, with help text that depends on runtime data filled in
pub fn command() -> clap::Command {
    Cli::command().mut_subcommand("ls", |ls| ls.after_help(frontends::ls_after_help()))
}

/// Parse arguments without exiting the process
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Clap's diagnostic as an input error, without its `error:` prefix
fn usage_error(e: &clap::Error) -> Error {
    let message = e.to_string();
    Error::input(message.trim().trim_start_matches("error:").trim_start())
}

/// Execute an already parsed invocation
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Frontend(command) => {
            let client = create_registry_client(cli.api_url, cli.timeout, cli.verbose)?;
            frontends::handle_frontend_command(command, &client).await?
        }
        Commands::Config { command } => config_cmd::handle_config_command(command).await?,
    }

    Ok(())
}

/// Create the registry client from flags, the config file and the environment
fn create_registry_client(
    api_url: Option<String>,
    timeout: Option<u64>,
    verbose: bool,
) -> anyhow::Result<RobinClient> {
    let file_config = if api_url.is_some() && timeout.is_some() {
        config::CliConfig::default()
    } else {
        config::CliConfig::load_or_default()
    };
    let api_url = config::resolve_api_url(api_url, &file_config)?;
    let timeout = config::resolve_timeout(timeout, &file_config)?;

    let client_config = ClientConfig { api_url, timeout, verbose };

    RobinClient::new(client_config)
        .map_err(|e| Error::config(format!("api-client cannot be created: {}", e)).into())
}

/// Filter used when `RUST_LOG` does not decide
fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "warn,robinctl=debug"
    } else {
        "warn,robinctl=info"
    }
}

fn initialise_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new(default_filter(verbose, quiet))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(false)
        .without_time()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
}
