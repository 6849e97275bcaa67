//! Terminal rendering for chat messages and panel views
//!
//! Messages are formatted as plain strings first and printed second, so
//! tests can assert on exactly what would reach the terminal. Backend-
//! supplied text is sanitized before display: control characters other
//! than newlines and tabs are stripped, the terminal analog of escaping
//! HTML in a browser log.

use crate::backend::types::{DeploymentStatus, FileContent, FileListing, LogsView};
use chrono::{DateTime, Local};
use colored::Colorize;
use std::fmt;

/// Who a chat message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// The person at the keyboard
    User,
    /// The Ecko assistant
    Bot,
    /// The client itself (errors, side-channel outcomes, hints)
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Bot => write!(f, "Ecko"),
            Self::System => write!(f, "System"),
        }
    }
}

/// Visual category of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary conversation text
    Normal,
    /// Neutral informational notice
    Info,
    /// A reported success
    Success,
    /// A reported failure
    Error,
    /// Something worth attention but not fatal
    Warn,
}

/// One rendered chat message
///
/// Immutable once created; the log only ever appends.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Attribution label
    pub sender: Sender,
    /// Message text, sanitized at construction
    pub text: String,
    /// Visual category
    pub kind: MessageKind,
    /// When the message was created
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(sender: Sender, text: &str, kind: MessageKind) -> Self {
        Self {
            sender,
            text: sanitize(text),
            kind,
            timestamp: Local::now(),
        }
    }

    /// A message typed by the user
    pub fn user(text: &str) -> Self {
        Self::new(Sender::User, text, MessageKind::Normal)
    }

    /// A reply from the assistant
    pub fn bot(text: &str) -> Self {
        Self::new(Sender::Bot, text, MessageKind::Normal)
    }

    /// A system message with the given visual category
    pub fn system(text: &str, kind: MessageKind) -> Self {
        Self::new(Sender::System, text, kind)
    }

    /// Format for the terminal, colored by sender and kind
    pub fn format(&self) -> String {
        let label = format!("[{}] {}:", self.timestamp.format("%H:%M:%S"), self.sender);
        let label = match self.sender {
            Sender::User => label.cyan().bold(),
            Sender::Bot => label.green().bold(),
            Sender::System => label.dimmed(),
        };
        let text = match self.kind {
            MessageKind::Normal => self.text.normal(),
            MessageKind::Info => self.text.cyan(),
            MessageKind::Success => self.text.green(),
            MessageKind::Error => self.text.red(),
            MessageKind::Warn => self.text.yellow(),
        };
        format!("{} {}", label, text)
    }

    /// Print to stdout
    pub fn print(&self) {
        println!("{}", self.format());
    }
}

/// Strip control characters the terminal would interpret
///
/// Newlines and tabs survive; everything else below 0x20 plus DEL and
/// ANSI escape introducers do not.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

/// Print the transient busy line shown while a call is in flight
pub fn print_busy(what: &str) {
    println!("{}", format!("... {}", what).dimmed());
}

/// Render the file list panel: one indexed line per file, in response order
pub fn render_file_list(listing: &FileListing) -> Vec<String> {
    if listing.files.is_empty() {
        return vec!["  (no files)".to_string()];
    }
    listing
        .files
        .iter()
        .enumerate()
        .map(|(idx, file)| format!("  {:>3}. {}", idx + 1, sanitize(file)))
        .collect()
}

/// Render the file content panel: a header with the inferred language,
/// then the content fenced off from the surrounding chat
pub fn render_file_content(path: &str, content: &FileContent) -> Vec<String> {
    let language = language_for_extension(path).unwrap_or("text");
    let mut lines = vec![format!("--- {} ({}) ---", sanitize(path), language)];
    lines.extend(sanitize(&content.content).lines().map(String::from));
    lines.push("--- end ---".to_string());
    lines
}

/// Best-effort syntax language from a file extension
pub fn language_for_extension(path: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(path)
        .extension()?
        .to_str()?
        .to_lowercase();

    let language = match extension.as_str() {
        "py" => "python",
        "rs" => "rust",
        "js" => "javascript",
        "ts" => "typescript",
        "sh" => "shell",
        "rb" => "ruby",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" => "markdown",
        "html" | "htm" => "html",
        "css" => "css",
        "sql" => "sql",
        _ => return None,
    };
    Some(language)
}

/// Render the logs panel for whichever shape the backend answered with
pub fn render_logs(view: &LogsView) -> Vec<String> {
    match view {
        LogsView::Entries(entries) => {
            if entries.is_empty() {
                vec!["  (no entries)".to_string()]
            } else {
                entries
                    .iter()
                    .map(|line| format!("  {}", sanitize(line)))
                    .collect()
            }
        }
        LogsView::Inline(content) => {
            let lines: Vec<String> = sanitize(content)
                .lines()
                .map(|line| format!("  {}", line))
                .collect();
            if lines.is_empty() {
                vec!["  (no entries)".to_string()]
            } else {
                lines
            }
        }
        LogsView::ArchivePending { url } => {
            vec![format!("  logs are being archived: {}", sanitize(url))]
        }
        LogsView::Status(status) => vec![format!("  log collection status: {}", sanitize(status))],
        LogsView::Failed(error) => vec![format!("  log fetch failed: {}", sanitize(error))],
    }
}

/// Render the deployment status panel: the run label plus the external
/// link when the backend provided one
pub fn render_deployment_status(target: &str, status: &DeploymentStatus) -> Vec<String> {
    let mut lines = vec![format!(
        "  {}: {}",
        sanitize(target),
        sanitize(status.label())
    )];
    if let Some(link) = &status.link {
        lines.push(format!("  details: {}", sanitize(link)));
    }
    lines
}
