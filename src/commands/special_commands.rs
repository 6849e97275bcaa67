//! Special commands parser for the interactive chat session
//!
//! This module parses the slash commands that can be entered during an
//! interactive session. Special commands drive the monitor panels and the
//! session gate rather than being sent to the assistant:
//! - Browse the backend's files and show one file's content
//! - Fetch logs
//! - Trigger a deployment and check deployment status
//! - Lock the session, show status, display help, exit
//!
//! Commands are prefixed with `/` and are case-insensitive in their
//! command word; arguments are taken verbatim.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during an interactive session
///
/// These commands query the backend's monitor endpoints or modify the
/// session, rather than being sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// List the files tracked by the backend
    Files,

    /// Show the content of one file
    Show(String),

    /// Fetch logs, optionally from a specific source with a line limit
    Logs {
        source: Option<String>,
        limit: Option<u32>,
    },

    /// Trigger a deployment of the given target
    Deploy(String),

    /// Show the status of the most recent deployment of the given target
    DeployStatus(String),

    /// Lock the session immediately, discarding the in-memory secret
    Lock,

    /// Display session status (gate state, backend URL)
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input to the assistant
    None,
}

/// Parse a user input string into a special command
///
/// Inputs not starting with `/` are passed through as chat text, except
/// the bare words `exit` and `quit`.
///
/// # Examples
///
/// ```
/// use ecko::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/files").unwrap();
/// assert_eq!(cmd, SpecialCommand::Files);
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/frobnicate").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        if lower == "exit" || lower == "quit" {
            return Ok(SpecialCommand::Exit);
        }
        return Ok(SpecialCommand::None);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("").to_lowercase();
    let rest = parts.next().map(str::trim).unwrap_or("");

    match command.as_str() {
        "/files" => {
            if rest.is_empty() {
                Ok(SpecialCommand::Files)
            } else {
                Err(CommandError::UnsupportedArgument {
                    command: "/files".to_string(),
                    arg: rest.to_string(),
                })
            }
        }

        "/show" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/show".to_string(),
                    usage: "/show <path>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Show(rest.to_string()))
            }
        }

        "/logs" => parse_logs_args(rest),

        "/deploy" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: "/deploy".to_string(),
                    usage: "/deploy <target>".to_string(),
                })
            } else {
                Ok(SpecialCommand::Deploy(rest.to_string()))
            }
        }

        "/status" => {
            if rest.is_empty() {
                Ok(SpecialCommand::ShowStatus)
            } else {
                Ok(SpecialCommand::DeployStatus(rest.to_string()))
            }
        }

        "/lock" => Ok(SpecialCommand::Lock),

        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Parse the optional `[source] [limit]` arguments of `/logs`
fn parse_logs_args(rest: &str) -> Result<SpecialCommand, CommandError> {
    let mut tokens = rest.split_whitespace();
    let source = tokens.next().map(str::to_string);
    let limit = match tokens.next() {
        Some(token) => Some(
            token
                .parse::<u32>()
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/logs".to_string(),
                    arg: token.to_string(),
                })?,
        ),
        None => None,
    };

    if let Some(extra) = tokens.next() {
        return Err(CommandError::UnsupportedArgument {
            command: "/logs".to_string(),
            arg: extra.to_string(),
        });
    }

    Ok(SpecialCommand::Logs { source, limit })
}

/// Print help for all special commands
pub fn print_help() {
    println!("Available commands:");
    println!("  /files                 List the files tracked by the backend");
    println!("  /show <path>           Show the content of one file");
    println!("  /logs [source] [n]     Fetch up to n log lines from a source");
    println!("  /deploy <target>       Trigger a deployment");
    println!("  /status                Show session status");
    println!("  /status <target>       Show the latest deployment status for a target");
    println!("  /lock                  Lock the session and discard the password");
    println!("  /help                  Show this help");
    println!("  exit, quit             Leave the session");
    println!();
    println!("Anything else is sent to Ecko as a chat message.");
}
