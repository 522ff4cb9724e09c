//! Sequential connection selection.

use std::sync::Arc;

use async_trait::async_trait;
use plugin_session_core::{Connection, ConnectionCandidate, ConnectionManager, ConnectionManagerFactory};

/// Tests whether a single candidate is reachable.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    /// Open a connection over `candidate`, or explain why it is unusable.
    async fn probe(&self, candidate: &ConnectionCandidate) -> Result<Arc<dyn Connection>, String>;
}

/// Tries candidates in listing order and keeps the first reachable one.
pub struct SequentialConnectionManager {
    server: Option<String>,
    candidates: Vec<ConnectionCandidate>,
    probe: Arc<dyn ConnectionProbe>,
}

impl SequentialConnectionManager {
    /// Create a manager over `candidates`.
    #[must_use]
    pub fn new(
        server: Option<String>,
        candidates: Vec<ConnectionCandidate>,
        probe: Arc<dyn ConnectionProbe>,
    ) -> Self {
        Self {
            server,
            candidates,
            probe,
        }
    }

    /// Factory that builds a sequential manager for every session.
    #[must_use]
    pub fn factory(probe: Arc<dyn ConnectionProbe>) -> SequentialFactory {
        SequentialFactory { probe }
    }
}

#[async_trait]
impl ConnectionManager for SequentialConnectionManager {
    fn candidates(&self) -> &[ConnectionCandidate] {
        &self.candidates
    }

    async fn test(&self) -> Result<Arc<dyn Connection>, String> {
        let server = self.server.as_deref().unwrap_or("-");
        let mut last_reason = None;

        for candidate in &self.candidates {
            match self.probe.probe(candidate).await {
                Ok(connection) => {
                    tracing::debug!(server, uri = %candidate.uri, "Connection available");
                    return Ok(connection);
                }
                Err(reason) => {
                    tracing::debug!(server, uri = %candidate.uri, "Connection unavailable: {reason}");
                    last_reason = Some(reason);
                }
            }
        }

        Err(match last_reason {
            Some(reason) => format!(
                "Unable to connect to server ({} connections tried): {reason}",
                self.candidates.len()
            ),
            None => "No connections available".to_string(),
        })
    }
}

/// Builds [`SequentialConnectionManager`]s sharing one probe.
#[derive(Clone)]
pub struct SequentialFactory {
    probe: Arc<dyn ConnectionProbe>,
}

impl ConnectionManagerFactory for SequentialFactory {
    fn build(
        &self,
        server_identifier: Option<&str>,
        candidates: Vec<ConnectionCandidate>,
    ) -> Box<dyn ConnectionManager> {
        Box::new(SequentialConnectionManager::new(
            server_identifier.map(str::to_string),
            candidates,
            Arc::clone(&self.probe),
        ))
    }
}
