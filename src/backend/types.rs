//! Response types for the Ecko backend
//!
//! Every endpoint's JSON is decoded exactly once, here, into a tagged
//! type. Downstream handlers match on variants instead of probing optional
//! fields out of a loose JSON value.

use crate::error::{EckoError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Maximum characters of raw body text carried into an error message
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Truncate a string to the error-preview length on a char boundary
pub(crate) fn preview(s: &str) -> &str {
    match s.char_indices().nth(ERROR_BODY_PREVIEW_CHARS) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Body of a successful backend response
///
/// A successful HTTP status with an unparsable body is not an error; the
/// raw text is carried through so each endpoint can decide what to do
/// with it.
#[derive(Debug, Clone)]
pub enum ApiPayload {
    /// Body parsed as JSON
    Json(Value),

    /// Body was not valid JSON; raw text and the HTTP status it came with
    RawText {
        /// The unparsed body
        text: String,
        /// HTTP status of the response
        status: u16,
    },
}

/// Side-channel outcome of a self-modification reported in a chat reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationOutcome {
    /// Status keyword reported by the backend
    pub status: String,
    /// Optional human-readable detail
    pub details: Option<String>,
}

impl ModificationOutcome {
    /// Whether the backend reported the modification as successful
    pub fn succeeded(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// Decoded reply from `POST /ecko`
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    /// The assistant's reply text, when one was produced
    pub response: Option<String>,
    /// Self-modification outcome, when the turn triggered one
    pub modification: Option<ModificationOutcome>,
    /// Deployment-trigger outcome, when the turn triggered one
    pub deployment_trigger: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyWire {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    modification_status: Option<String>,
    #[serde(default)]
    modification_details: Option<String>,
    #[serde(default)]
    deployment_trigger_status: Option<String>,
}

impl ChatReply {
    /// Decode the `/ecko` payload
    ///
    /// A raw-text body is rendered as the reply itself: the backend spoke,
    /// just not in JSON.
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => {
                let wire: ChatReplyWire =
                    serde_json::from_value(value).map_err(|e| EckoError::MalformedResponse {
                        endpoint: "/ecko".to_string(),
                        detail: e.to_string(),
                    })?;
                let modification = wire.modification_status.map(|status| ModificationOutcome {
                    status,
                    details: wire.modification_details,
                });
                Ok(Self {
                    response: wire.response,
                    modification,
                    deployment_trigger: wire.deployment_trigger_status,
                })
            }
            ApiPayload::RawText { text, .. } => Ok(Self {
                response: Some(text),
                ..Default::default()
            }),
        }
    }
}

/// Decoded reply from `GET /list_files`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    /// File paths in the order the backend returned them
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FileListingWire {
    files: Vec<String>,
}

impl FileListing {
    /// Decode the `/list_files` payload; the `files` array is required
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => {
                let wire: FileListingWire =
                    serde_json::from_value(value).map_err(|e| EckoError::MalformedResponse {
                        endpoint: "/list_files".to_string(),
                        detail: e.to_string(),
                    })?;
                Ok(Self { files: wire.files })
            }
            ApiPayload::RawText { text, .. } => Err(EckoError::MalformedResponse {
                endpoint: "/list_files".to_string(),
                detail: format!("expected JSON, got: {}", preview(&text)),
            }
            .into()),
        }
    }
}

/// Decoded reply from `GET /get_file_content`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// The file's content
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct FileContentWire {
    content: String,
}

impl FileContent {
    /// Decode the `/get_file_content` payload
    ///
    /// A raw-text body is taken as the content itself.
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => {
                let wire: FileContentWire =
                    serde_json::from_value(value).map_err(|e| EckoError::MalformedResponse {
                        endpoint: "/get_file_content".to_string(),
                        detail: e.to_string(),
                    })?;
                Ok(Self {
                    content: wire.content,
                })
            }
            ApiPayload::RawText { text, .. } => Ok(Self { content: text }),
        }
    }
}

/// Decoded reply from `GET /get_logs`
///
/// The logs endpoint answers in one of several shapes depending on how the
/// backend sourced the logs; the shape is resolved here, once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogsView {
    /// Log lines delivered inline as an array
    Entries(Vec<String>),

    /// Log content delivered inline as a single block of text
    Inline(String),

    /// Logs are being archived; a URL to poll or download
    ArchivePending {
        /// Where the archive will appear
        url: String,
    },

    /// An explicit status keyword with no content
    Status(String),

    /// The backend reported an error for this source
    Failed(String),
}

impl LogsView {
    /// Decode the `/get_logs` payload
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => Self::from_value(&value).ok_or_else(|| {
                EckoError::MalformedResponse {
                    endpoint: "/get_logs".to_string(),
                    detail: "unrecognized response shape".to_string(),
                }
                .into()
            }),
            ApiPayload::RawText { text, .. } => Ok(Self::Inline(text)),
        }
    }

    /// Resolve which of the recognized shapes a JSON value is
    ///
    /// Recognition order: error field, inline array, inline string,
    /// pending archive URL, bare status keyword.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Some(Self::Failed(error.to_string()));
        }

        match value.get("logs") {
            Some(Value::Array(entries)) => {
                let lines = entries
                    .iter()
                    .map(|entry| match entry {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                return Some(Self::Entries(lines));
            }
            Some(Value::String(content)) => {
                return Some(Self::Inline(content.clone()));
            }
            _ => {}
        }

        if let Some(url) = value.get("archive_url").and_then(Value::as_str) {
            return Some(Self::ArchivePending {
                url: url.to_string(),
            });
        }

        if let Some(status) = value.get("status").and_then(Value::as_str) {
            return Some(Self::Status(status.to_string()));
        }

        None
    }
}

/// Decoded reply from `POST /trigger_deploy`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployAck {
    /// Acknowledgement message, when the backend sent one
    pub message: Option<String>,
    /// Trigger outcome keyword, when the backend sent one
    pub trigger_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeployAckWire {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    deployment_trigger_status: Option<String>,
}

impl DeployAck {
    /// Decode the `/trigger_deploy` payload
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => {
                let wire: DeployAckWire =
                    serde_json::from_value(value).map_err(|e| EckoError::MalformedResponse {
                        endpoint: "/trigger_deploy".to_string(),
                        detail: e.to_string(),
                    })?;
                Ok(Self {
                    message: wire.message,
                    trigger_status: wire.deployment_trigger_status,
                })
            }
            ApiPayload::RawText { text, .. } => Ok(Self {
                message: Some(text),
                trigger_status: None,
            }),
        }
    }
}

/// Decoded reply from `GET /deployment_status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStatus {
    /// Workflow status keyword (queued, in_progress, completed, ...)
    pub status: String,
    /// Conclusion keyword, present once the run has completed
    pub conclusion: Option<String>,
    /// External link to the run, when the backend provided one
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeploymentStatusWire {
    status_details: StatusDetailsWire,
}

#[derive(Debug, Deserialize)]
struct StatusDetailsWire {
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl DeploymentStatus {
    /// Decode the `/deployment_status` payload; `status_details.status`
    /// is required and `html_url` is preferred over `url` for the link
    pub fn from_payload(payload: ApiPayload) -> Result<Self> {
        match payload {
            ApiPayload::Json(value) => {
                let wire: DeploymentStatusWire =
                    serde_json::from_value(value).map_err(|e| EckoError::MalformedResponse {
                        endpoint: "/deployment_status".to_string(),
                        detail: e.to_string(),
                    })?;
                let details = wire.status_details;
                Ok(Self {
                    status: details.status,
                    conclusion: details.conclusion,
                    link: details.html_url.or(details.url),
                })
            }
            ApiPayload::RawText { text, .. } => Err(EckoError::MalformedResponse {
                endpoint: "/deployment_status".to_string(),
                detail: format!("expected JSON, got: {}", preview(&text)),
            }
            .into()),
        }
    }

    /// The label shown for this run: the conclusion once completed,
    /// otherwise the status keyword
    pub fn label(&self) -> &str {
        match (&self.conclusion, self.status.as_str()) {
            (Some(conclusion), "completed") => conclusion,
            _ => &self.status,
        }
    }
}
