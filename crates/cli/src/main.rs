mod commands;
mod profile;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use commands::auth::{self, AuthCommand};
use commands::issue::{self, IssueCommand};
use profile::resolve_active_profile;
use tracing_subscriber::{fmt, EnvFilter};
use youtrack_cli_api::ApiError;
use youtrack_cli_auth::CredentialStore;
use youtrack_cli_config::Config;

#[derive(Parser, Debug)]
#[command(name = "youtrack-cli", version, about = "YouTrack REST API client", long_about = None)]
struct Cli {
    /// Profile to use from config file
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Path to config file (defaults to ~/.youtrack-cli/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: YouTrackCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum YouTrackCommand {
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Issue commands
    #[command(subcommand)]
    Issue(IssueCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let result = run(cli).await;
    if let Err(err) = &result {
        if let Some(hint) = err.downcast_ref::<ApiError>().and_then(ApiError::suggestion) {
            eprintln!("hint: {hint}");
        }
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let mut config = Config::load(config_path.as_ref())?;
    let credential_store = CredentialStore::new("youtrack-cli")?;

    match cli.command {
        YouTrackCommand::Auth(command) => {
            auth::handle(
                command,
                &mut config,
                config_path.as_deref(),
                cli.profile.as_deref(),
                &credential_store,
            )
            .await?
        }
        YouTrackCommand::Issue(command) => {
            let profile =
                resolve_active_profile(&config, cli.profile.as_deref(), &credential_store)?;
            issue::execute(command, &profile).await?
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,youtrack_cli=debug,youtrack_cli_api=debug,youtrack_cli_config=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}
