//! Ecko - terminal client for the Ecko chat backend
//!
#![doc = "Main entry point for the Ecko client application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ecko::cli::{Cli, Commands, DeployCommand, FilesCommand};
use ecko::commands;
use ecko::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a session file on the CLI, mirror it into
    // ECKO_SESSION_FILE so the store initializer can pick it up. This keeps
    // callers unchanged while allowing `FileSessionStore::new()` to honor
    // an override.
    if let Some(session_file) = &cli.session_file {
        std::env::set_var(ecko::session::SESSION_FILE_ENV, session_file);
        tracing::info!("Using session file override from CLI: {}", session_file);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat session");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Files { command } => match command {
            FilesCommand::List => {
                tracing::info!("Listing backend files");
                commands::panels::run_list_files(config).await?;
                Ok(())
            }
            FilesCommand::Show { path } => {
                tracing::info!("Showing backend file: {}", path);
                commands::panels::run_show_file(config, &path).await?;
                Ok(())
            }
        },
        Commands::Logs { source, limit } => {
            tracing::info!("Fetching backend logs");
            commands::panels::run_logs(config, source, limit).await?;
            Ok(())
        }
        Commands::Deploy { command } => match command {
            DeployCommand::Trigger { target } => {
                tracing::info!("Triggering deployment of {}", target);
                commands::panels::run_trigger_deploy(config, &target).await?;
                Ok(())
            }
            DeployCommand::Status { target } => {
                tracing::info!("Fetching deployment status for {}", target);
                commands::panels::run_deployment_status(config, &target).await?;
                Ok(())
            }
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ecko=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
