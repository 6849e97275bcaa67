//! Command-line interface definition for the Ecko client
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat session and one-shot panel commands.

use clap::{Parser, Subcommand};

/// Ecko - terminal client for the Ecko chat backend
///
/// Talk to the Ecko assistant and monitor its backend (files, logs,
/// deployments) from the terminal. Access is gated behind the backend
/// password; the secret is held in memory only and never written to disk.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecko")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the backend base URL from the config file
    #[arg(long, env = "ECKO_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Override the session flag file location
    #[arg(long)]
    pub session_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Ecko client
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session with the assistant
    Chat,

    /// Browse files tracked by the backend
    Files {
        /// File browsing subcommand
        #[command(subcommand)]
        command: FilesCommand,
    },

    /// Fetch backend logs
    Logs {
        /// Log source to read from
        #[arg(short, long)]
        source: Option<String>,

        /// Maximum number of log lines to fetch
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Trigger deployments and check their status
    Deploy {
        /// Deployment subcommand
        #[command(subcommand)]
        command: DeployCommand,
    },
}

/// File browsing subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FilesCommand {
    /// List the files tracked by the backend
    List,

    /// Show the content of one file
    Show {
        /// Path of the file to show
        path: String,
    },
}

/// Deployment subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DeployCommand {
    /// Trigger a deployment of the given target
    Trigger {
        /// Deployment target (e.g. backend, frontend)
        target: String,
    },

    /// Show the status of the most recent deployment of the given target
    Status {
        /// Deployment target (e.g. backend, frontend)
        target: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
