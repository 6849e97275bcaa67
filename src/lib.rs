//! Ecko - terminal client library for the Ecko chat backend
//!
//! This library provides the core functionality for the Ecko client,
//! including the backend gateway, session gating, message rendering,
//! and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `backend`: HTTP gateway and typed response decodings per endpoint
//! - `session`: Password gate state machine and its persistence collaborator
//! - `render`: Terminal formatting for chat messages and panel views
//! - `commands`: Interactive chat session and monitor panel handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use ecko::backend::BackendClient;
//! use ecko::session::{MemorySessionStore, Session};
//! use ecko::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = BackendClient::new(&config.backend)?;
//!     let mut session = Session::resume(Box::new(MemorySessionStore::new()));
//!     session.submit_password("hunter2")?;
//!     client.probe(&mut session).await?;
//!
//!     let reply = client.send_chat(&mut session, "hello").await?;
//!     println!("{:?}", reply.response);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use backend::BackendClient;
pub use config::Config;
pub use error::{EckoError, Result};
pub use render::{ChatMessage, MessageKind, Sender};
pub use session::{GateState, Session, SessionStore};
