//! HTTP gateway to the Ecko backend
//!
//! This module owns the one place requests are built and responses are
//! classified. Every call checks the configuration and the session gate
//! before any network I/O, attaches the auth header, and decodes the body
//! into the endpoint's typed response at the boundary.

use crate::backend::types::{
    preview, ApiPayload, ChatReply, DeployAck, DeploymentStatus, FileContent, FileListing,
    LogsView,
};
use crate::config::BackendConfig;
use crate::error::{EckoError, Result};
use crate::session::Session;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// Custom header carrying the raw session secret on every call
///
/// The secret is sent in cleartext; transport security is the backend
/// URL's job (https), not this client's.
pub const AUTH_HEADER: &str = "X-Ecko-Auth";

/// Gateway to the Ecko backend
///
/// Holds the HTTP client and base URL; the session is passed into each
/// call so auth state stays with the caller, not the gateway.
///
/// # Examples
///
/// ```no_run
/// use ecko::backend::BackendClient;
/// use ecko::config::BackendConfig;
/// use ecko::session::{MemorySessionStore, Session};
///
/// # async fn example() -> ecko::error::Result<()> {
/// let config = BackendConfig {
///     base_url: "https://ecko.example.com".to_string(),
///     timeout_seconds: 60,
/// };
/// let client = BackendClient::new(&config)?;
/// let mut session = Session::resume(Box::new(MemorySessionStore::new()));
/// session.submit_password("hunter2")?;
/// let reply = client.send_chat(&mut session, "hello").await?;
/// # Ok(())
/// # }
/// ```
pub struct BackendClient {
    client: Client,
    base_url: String,
    configured: bool,
}

impl BackendClient {
    /// Create a new gateway instance
    ///
    /// The HTTP client is built exactly once here. An unconfigured base URL
    /// is accepted; calls fail closed with a configuration error instead.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ecko/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EckoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let configured = config.is_configured();
        if !configured {
            tracing::warn!("Backend URL is not configured; all calls will fail closed");
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            configured,
        })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat turn to the assistant
    pub async fn send_chat(&self, session: &mut Session, message: &str) -> Result<ChatReply> {
        let payload = self
            .call(
                session,
                Method::POST,
                "/ecko",
                &[],
                Some(json!({ "message": message })),
            )
            .await?;
        ChatReply::from_payload(payload)
    }

    /// Fetch the list of files tracked by the backend
    pub async fn list_files(&self, session: &mut Session) -> Result<FileListing> {
        let payload = self
            .call(session, Method::GET, "/list_files", &[], None)
            .await?;
        FileListing::from_payload(payload)
    }

    /// Fetch the content of one file
    pub async fn file_content(&self, session: &mut Session, path: &str) -> Result<FileContent> {
        let payload = self
            .call(
                session,
                Method::GET,
                "/get_file_content",
                &[("path", path.to_string())],
                None,
            )
            .await?;
        FileContent::from_payload(payload)
    }

    /// Fetch logs from the given source
    pub async fn logs(&self, session: &mut Session, source: &str, limit: u32) -> Result<LogsView> {
        let payload = self
            .call(
                session,
                Method::GET,
                "/get_logs",
                &[("source", source.to_string()), ("limit", limit.to_string())],
                None,
            )
            .await?;
        LogsView::from_payload(payload)
    }

    /// Trigger a deployment of the given target
    ///
    /// Fire-and-forget: the only follow-up is the caller re-fetching the
    /// target's status after a delay.
    pub async fn trigger_deploy(&self, session: &mut Session, target: &str) -> Result<DeployAck> {
        let payload = self
            .call(
                session,
                Method::POST,
                "/trigger_deploy",
                &[],
                Some(json!({ "target": target })),
            )
            .await?;
        DeployAck::from_payload(payload)
    }

    /// Fetch the status of the most recent deployment of the given target
    pub async fn deployment_status(
        &self,
        session: &mut Session,
        target: &str,
    ) -> Result<DeploymentStatus> {
        let payload = self
            .call(
                session,
                Method::GET,
                "/deployment_status",
                &[("target", target.to_string())],
                None,
            )
            .await?;
        DeploymentStatus::from_payload(payload)
    }

    /// Verify a tentatively-entered secret with a harmless authenticated call
    ///
    /// Uses the cheapest authenticated read (`/list_files`). On success the
    /// gate is confirmed `Unlocked`; a 401/403 has already relocked it by
    /// the time the error propagates.
    pub async fn probe(&self, session: &mut Session) -> Result<()> {
        self.list_files(session).await?;
        session.confirm();
        Ok(())
    }

    /// Core request path shared by every endpoint
    ///
    /// Checks configuration and the gate before any network I/O, attaches
    /// the auth header, reads the body as text, and classifies the outcome.
    async fn call(
        &self,
        session: &mut Session,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<ApiPayload> {
        if !self.configured {
            return Err(EckoError::Config(
                "backend URL is not set; deploy the backend and configure backend.base_url"
                    .to_string(),
            )
            .into());
        }

        let secret = match session.secret() {
            Some(secret) if session.is_unlocked() => secret.to_string(),
            _ => {
                // A call without a usable secret also forces the gate shut,
                // so the UI and the state agree.
                session.lock();
                return Err(EckoError::Authentication(
                    "session is locked; enter the password first".to_string(),
                )
                .into());
            }
        };

        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("Calling {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTH_HEADER, secret);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", endpoint, e);
            EckoError::Api(format!("request to {} failed: {}", endpoint, e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from {}: {}", endpoint, e);
            EckoError::Api(format!("failed to read response from {}: {}", endpoint, e))
        })?;

        if status.is_success() {
            return Ok(match serde_json::from_str::<Value>(&text) {
                Ok(value) => ApiPayload::Json(value),
                Err(_) => {
                    tracing::debug!(
                        "Response from {} was not JSON ({} bytes), carrying raw text",
                        endpoint,
                        text.len()
                    );
                    ApiPayload::RawText {
                        text,
                        status: status.as_u16(),
                    }
                }
            });
        }

        let detail = error_detail(&text, status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                "Backend rejected credentials on {} ({}); locking session",
                endpoint,
                status
            );
            session.lock();
            return Err(EckoError::Authentication(detail).into());
        }

        tracing::error!("Backend returned {} on {}: {}", status, endpoint, detail);
        Err(EckoError::Api(format!("{} returned {}: {}", endpoint, status.as_u16(), detail)).into())
    }
}

/// Build the most useful detail string available for a failed response
///
/// Preference order: a parsed `error` field, then the raw body truncated
/// to the preview length, then the canonical status reason.
fn error_detail(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return preview(trimmed).to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn configured_backend() -> BackendConfig {
        BackendConfig {
            base_url: "https://ecko.example.com/".to_string(),
            timeout_seconds: 60,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = BackendClient::new(&configured_backend());
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new(&configured_backend()).unwrap();
        assert_eq!(client.base_url(), "https://ecko.example.com");
    }

    #[test]
    fn test_error_detail_prefers_error_field() {
        let detail = error_detail(
            r#"{"error": "bad request", "hint": "ignored"}"#,
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(detail, "bad request");
    }

    #[test]
    fn test_error_detail_falls_back_to_body() {
        let detail = error_detail("plain failure text", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "plain failure text");
    }

    #[test]
    fn test_error_detail_truncates_body() {
        let body = "y".repeat(500);
        let detail = error_detail(&body, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail.len(), 200);
    }

    #[test]
    fn test_error_detail_falls_back_to_status_reason() {
        let detail = error_detail("", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(detail, "Service Unavailable");
    }

    #[test]
    fn test_error_detail_json_without_error_field_uses_body() {
        let detail = error_detail(r#"{"status": "broken"}"#, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, r#"{"status": "broken"}"#);
    }
}
