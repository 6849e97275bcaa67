/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`   — Interactive chat session with the assistant
- `panels` — Monitor panels (files, logs, deployments), used both as
  slash commands inside a chat session and as one-shot CLI commands

These handlers are intentionally small and use the library components:
the backend gateway, the session gate, and the renderer.
*/

use crate::backend::BackendClient;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::render::{self, ChatMessage, MessageKind};
use crate::session::{FileSessionStore, Session};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

// Special commands parser for the interactive session
pub mod special_commands;

/// Build the gateway, session, and line editor for a command
fn bootstrap(config: &Config) -> Result<(BackendClient, Session, DefaultEditor)> {
    let client = BackendClient::new(&config.backend)?;
    let store = FileSessionStore::new()?;
    let session = Session::resume(Box::new(store));
    let editor = DefaultEditor::new()?;
    Ok((client, session, editor))
}

/// Prompt for the password until the gate is open or the user gives up
///
/// Returns Ok(false) when the user aborted with Ctrl-C or Ctrl-D. Each
/// accepted password is verified with a probe call; an auth rejection
/// relocks the gate and the loop prompts again. Probe failures that are
/// not auth rejections (network, configuration) are reported and leave
/// the tentative unlock in place, so the caller can proceed and let the
/// next real call arbitrate.
async fn ensure_unlocked(
    client: &BackendClient,
    session: &mut Session,
    editor: &mut DefaultEditor,
) -> Result<bool> {
    while !session.is_unlocked() {
        if session.needs_reentry() {
            ChatMessage::system(
                "Session restored; the password must be re-entered.",
                MessageKind::Info,
            )
            .print();
        }

        match editor.readline("Password: ") {
            Ok(line) => {
                if let Err(e) = session.submit_password(&line) {
                    ChatMessage::system(&e.to_string(), MessageKind::Error).print();
                    continue;
                }

                render::print_busy("verifying password");
                match client.probe(session).await {
                    Ok(()) => {
                        ChatMessage::system("Unlocked.", MessageKind::Success).print();
                    }
                    Err(e) => {
                        // A 401/403 has already relocked the gate; the loop
                        // condition picks that up and prompts again.
                        ChatMessage::system(&e.to_string(), MessageKind::Error).print();
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Display the welcome banner for an interactive session
fn print_welcome_banner(base_url: &str) {
    use colored::Colorize;

    println!("{}", "Ecko".green().bold());
    println!("Backend: {}", base_url);
    println!("Type '/help' for commands, 'exit' to leave.");
    println!();
}

/// Display session status: gate state and backend URL
fn print_status_display(session: &Session, base_url: &str) {
    println!("Session:  {}", session.state());
    println!("Backend:  {}", base_url);
    println!();
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Opens the session gate, then runs a readline-based loop that sends
    //! user input to the backend's chat endpoint and dispatches slash
    //! commands to the monitor panels.

    use super::*;

    /// One chat turn: echo, call the backend, render the outcome
    ///
    /// A blank input is a no-op and performs no network call. The user's
    /// message is echoed before the request is issued. Side-channel
    /// outcomes in the reply (self-modification, deployment trigger)
    /// render as separate system messages, and a successful modification
    /// re-fetches the file list. Errors render as system messages; the
    /// prompt is restored by the caller's loop in every path.
    ///
    /// Returns the messages appended to the log, in render order.
    pub async fn send(
        client: &BackendClient,
        session: &mut Session,
        text: &str,
    ) -> Vec<ChatMessage> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut log = Vec::new();

        let echo = ChatMessage::user(trimmed);
        echo.print();
        log.push(echo);

        render::print_busy("Ecko is thinking");

        match client.send_chat(session, trimmed).await {
            Ok(reply) => {
                if let Some(response) = &reply.response {
                    let message = ChatMessage::bot(response);
                    message.print();
                    log.push(message);
                }

                if let Some(modification) = &reply.modification {
                    let kind = if modification.succeeded() {
                        MessageKind::Success
                    } else {
                        MessageKind::Warn
                    };
                    let text = match &modification.details {
                        Some(details) => {
                            format!("modification {}: {}", modification.status, details)
                        }
                        None => format!("modification {}", modification.status),
                    };
                    let message = ChatMessage::system(&text, kind);
                    message.print();
                    log.push(message);

                    if modification.succeeded() {
                        // The backend changed its own files; refresh the listing
                        match client.list_files(session).await {
                            Ok(listing) => {
                                println!("Files:");
                                for line in render::render_file_list(&listing) {
                                    println!("{}", line);
                                }
                            }
                            Err(e) => {
                                let message =
                                    ChatMessage::system(&e.to_string(), MessageKind::Error);
                                message.print();
                                log.push(message);
                            }
                        }
                    }
                }

                if let Some(trigger) = &reply.deployment_trigger {
                    let message = ChatMessage::system(
                        &format!("deployment trigger: {}", trigger),
                        MessageKind::Info,
                    );
                    message.print();
                    log.push(message);
                }
            }
            Err(e) => {
                let message = ChatMessage::system(&e.to_string(), MessageKind::Error);
                message.print();
                log.push(message);
            }
        }

        log
    }

    /// Start the interactive chat session
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let (client, mut session, mut editor) = bootstrap(&config)?;

        print_welcome_banner(client.base_url());

        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }

        loop {
            if !session.is_unlocked() {
                // A call came back 401/403 and relocked the gate
                if !ensure_unlocked(&client, &mut session, &mut editor).await? {
                    break;
                }
            }

            match editor.readline("ecko> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Files) => {
                            panels::show_file_list(&client, &mut session).await;
                        }
                        Ok(SpecialCommand::Show(path)) => {
                            panels::show_file_content(&client, &mut session, &path).await;
                        }
                        Ok(SpecialCommand::Logs { source, limit }) => {
                            let source = source
                                .unwrap_or_else(|| config.client.default_log_source.clone());
                            let limit = limit.unwrap_or(config.client.default_log_limit);
                            panels::show_logs(&client, &mut session, &source, limit).await;
                        }
                        Ok(SpecialCommand::Deploy(target)) => {
                            panels::run_deploy(
                                &client,
                                &mut session,
                                &target,
                                config.client.deploy_status_delay_seconds,
                            )
                            .await;
                        }
                        Ok(SpecialCommand::DeployStatus(target)) => {
                            panels::show_deployment_status(&client, &mut session, &target).await;
                        }
                        Ok(SpecialCommand::Lock) => {
                            session.lock();
                            ChatMessage::system("Session locked.", MessageKind::Info).print();
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&session, client.base_url());
                        }
                        Ok(SpecialCommand::Help) => print_help(),
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {
                            send(&client, &mut session, trimmed).await;
                        }
                        Err(e) => {
                            ChatMessage::system(&e.to_string(), MessageKind::Warn).print();
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    break;
                }
            }
        }

        println!("Goodbye.");
        Ok(())
    }
}

// Monitor panel handlers
pub mod panels {
    //! Monitor panels: file list, file content, logs, deployments.
    //!
    //! Each handler follows the same shape: show a busy line, call one
    //! endpoint, render its view or an inline error, and return with the
    //! prompt restored.

    use super::*;
    use std::time::Duration;

    /// File list panel
    pub async fn show_file_list(client: &BackendClient, session: &mut Session) {
        render::print_busy("fetching file list");
        match client.list_files(session).await {
            Ok(listing) => {
                println!("Files:");
                for line in render::render_file_list(&listing) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                ChatMessage::system(&format!("file list failed: {}", e), MessageKind::Error)
                    .print();
            }
        }
    }

    /// File content panel
    pub async fn show_file_content(client: &BackendClient, session: &mut Session, path: &str) {
        render::print_busy(&format!("fetching {}", path));
        match client.file_content(session, path).await {
            Ok(content) => {
                for line in render::render_file_content(path, &content) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                ChatMessage::system(&format!("file fetch failed: {}", e), MessageKind::Error)
                    .print();
            }
        }
    }

    /// Log viewer panel
    pub async fn show_logs(client: &BackendClient, session: &mut Session, source: &str, limit: u32) {
        render::print_busy(&format!("fetching logs from {}", source));
        match client.logs(session, source, limit).await {
            Ok(view) => {
                println!("Logs ({}):", source);
                for line in render::render_logs(&view) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                ChatMessage::system(&format!("log fetch failed: {}", e), MessageKind::Error)
                    .print();
            }
        }
    }

    /// Deployment status panel
    pub async fn show_deployment_status(
        client: &BackendClient,
        session: &mut Session,
        target: &str,
    ) {
        render::print_busy(&format!("fetching deployment status for {}", target));
        match client.deployment_status(session, target).await {
            Ok(status) => {
                println!("Deployment:");
                for line in render::render_deployment_status(target, &status) {
                    println!("{}", line);
                }
            }
            Err(e) => {
                ChatMessage::system(
                    &format!("deployment status failed: {}", e),
                    MessageKind::Error,
                )
                .print();
            }
        }
    }

    /// Deployment trigger panel
    ///
    /// Fire-and-forget: the trigger is acknowledged immediately and the
    /// only follow-up is one delayed status re-fetch for the target.
    pub async fn run_deploy(
        client: &BackendClient,
        session: &mut Session,
        target: &str,
        status_delay_seconds: u64,
    ) {
        render::print_busy(&format!("triggering deployment of {}", target));
        match client.trigger_deploy(session, target).await {
            Ok(ack) => {
                if let Some(message) = &ack.message {
                    ChatMessage::system(message, MessageKind::Info).print();
                }
                if let Some(status) = &ack.trigger_status {
                    ChatMessage::system(
                        &format!("trigger status: {}", status),
                        MessageKind::Info,
                    )
                    .print();
                }
                tokio::time::sleep(Duration::from_secs(status_delay_seconds)).await;
                show_deployment_status(client, session, target).await;
            }
            Err(e) => {
                ChatMessage::system(
                    &format!("deployment trigger failed: {}", e),
                    MessageKind::Error,
                )
                .print();
            }
        }
    }

    /// One-shot `ecko files list`
    pub async fn run_list_files(config: Config) -> Result<()> {
        let (client, mut session, mut editor) = bootstrap(&config)?;
        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }
        show_file_list(&client, &mut session).await;
        Ok(())
    }

    /// One-shot `ecko files show <path>`
    pub async fn run_show_file(config: Config, path: &str) -> Result<()> {
        let (client, mut session, mut editor) = bootstrap(&config)?;
        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }
        show_file_content(&client, &mut session, path).await;
        Ok(())
    }

    /// One-shot `ecko logs`
    pub async fn run_logs(
        config: Config,
        source: Option<String>,
        limit: Option<u32>,
    ) -> Result<()> {
        let (client, mut session, mut editor) = bootstrap(&config)?;
        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }
        let source = source.unwrap_or_else(|| config.client.default_log_source.clone());
        let limit = limit.unwrap_or(config.client.default_log_limit);
        show_logs(&client, &mut session, &source, limit).await;
        Ok(())
    }

    /// One-shot `ecko deploy trigger <target>`
    pub async fn run_trigger_deploy(config: Config, target: &str) -> Result<()> {
        let (client, mut session, mut editor) = bootstrap(&config)?;
        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }
        run_deploy(
            &client,
            &mut session,
            target,
            config.client.deploy_status_delay_seconds,
        )
        .await;
        Ok(())
    }

    /// One-shot `ecko deploy status <target>`
    pub async fn run_deployment_status(config: Config, target: &str) -> Result<()> {
        let (client, mut session, mut editor) = bootstrap(&config)?;
        if !ensure_unlocked(&client, &mut session, &mut editor).await? {
            return Ok(());
        }
        show_deployment_status(&client, &mut session, target).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::render::Sender;
    use crate::session::MemorySessionStore;

    fn offline_client() -> BackendClient {
        // A configured URL that is never dialed in these tests
        BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_blank_input_is_noop() {
        let client = offline_client();
        let mut session = Session::resume(Box::new(MemorySessionStore::new()));
        session.submit_password("pw").unwrap();

        let log = chat::send(&client, &mut session, "   ").await;
        assert!(log.is_empty());
        // No call was made, so the gate is untouched
        assert!(session.is_unlocked());
    }

    #[tokio::test]
    async fn test_send_with_locked_gate_echoes_then_errors_without_io() {
        let client = offline_client();
        let mut session = Session::resume(Box::new(MemorySessionStore::new()));

        let log = chat::send(&client, &mut session, "hi").await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, Sender::User);
        assert_eq!(log[0].text, "hi");
        assert_eq!(log[1].sender, Sender::System);
        assert_eq!(log[1].kind, MessageKind::Error);
        assert!(log[1].text.contains("Authentication"));
    }
}
