//! Collaborator traits for credential storage and connectivity.

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ConnectionCandidate;

/// Storage error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Synchronous string key/value store for credentials.
///
/// Implementations are shared between sessions; each session only touches
/// keys under its own `server.<identifier>.` prefix.
pub trait CredentialStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Transport-level failure: the request never produced a structured answer.
///
/// The payload and status are forwarded exactly as the transport reported
/// them.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Transport error (status {status:?}): {payload}")]
pub struct TransportError {
    /// Raw failure data.
    pub payload: Value,
    /// HTTP-style status code, when the transport had one.
    pub status: Option<u16>,
}

impl TransportError {
    /// Create a transport error.
    #[must_use]
    pub fn new(payload: impl Into<Value>, status: Option<u16>) -> Self {
        Self {
            payload: payload.into(),
            status,
        }
    }
}

/// Request method for direct resource fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

/// Direct resource request configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequest {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl ResourceRequest {
    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }
}

/// Direct resource response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    pub status: u16,
    pub body: Value,
}

/// A reachable network path to a server.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Candidate this connection was established over.
    fn candidate(&self) -> &ConnectionCandidate;

    /// Issue a direct resource request relative to the connection's uri.
    async fn request(
        &self,
        path: &str,
        request: ResourceRequest,
    ) -> Result<ResourceResponse, TransportError>;
}

/// Owns a server's connection candidates and picks a live one.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Candidates this manager selects from.
    fn candidates(&self) -> &[ConnectionCandidate];

    /// Resolve to exactly one working connection.
    ///
    /// Fails with a human-readable reason when no candidate works.
    async fn test(&self) -> Result<Arc<dyn Connection>, String>;
}

/// Builds the connection manager for a session.
pub trait ConnectionManagerFactory: Send + Sync {
    /// Build a manager over `candidates` for the server `server_identifier`.
    fn build(
        &self,
        server_identifier: Option<&str>,
        candidates: Vec<ConnectionCandidate>,
    ) -> Box<dyn ConnectionManager>;
}

impl<F> ConnectionManagerFactory for F
where
    F: Fn(Option<&str>, Vec<ConnectionCandidate>) -> Box<dyn ConnectionManager> + Send + Sync,
{
    fn build(
        &self,
        server_identifier: Option<&str>,
        candidates: Vec<ConnectionCandidate>,
    ) -> Box<dyn ConnectionManager> {
        self(server_identifier, candidates)
    }
}
