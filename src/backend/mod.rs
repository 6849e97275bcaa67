//! Backend gateway module for the Ecko client
//!
//! This module contains the HTTP gateway and the typed response
//! decodings for every backend endpoint.

pub mod client;
pub mod types;

pub use client::{BackendClient, AUTH_HEADER};
pub use types::{
    ApiPayload, ChatReply, DeployAck, DeploymentStatus, FileContent, FileListing, LogsView,
    ModificationOutcome,
};
