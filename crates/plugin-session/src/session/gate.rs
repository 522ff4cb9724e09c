//! Plugin version gate.

use plugin_session_core::{PING_FUNCTION, PLUGIN_VERSION_MINIMUM, version};
use serde::Deserialize;
use serde_json::Map;

use super::Session;
use crate::error::{CallError, SessionError};

#[derive(Debug, Deserialize)]
struct Pong {
    version: String,
}

impl Session {
    /// Probe the plugin version and check it against the minimum.
    ///
    /// The reported version is recorded even when it is too old.
    ///
    /// # Errors
    /// Returns [`SessionError::UpdateRequired`] for an outdated plugin, or
    /// [`SessionError::Ping`] if the probe itself fails.
    pub async fn check(&mut self) -> Result<(), SessionError> {
        let response = self
            .call(PING_FUNCTION, Vec::new(), Map::new())
            .await
            .map_err(SessionError::Ping)?;

        let pong: Pong = serde_json::from_value(response)
            .map_err(|e| SessionError::Ping(CallError::Decode(e.to_string())))?;

        self.plugin_version = Some(pong.version.clone());

        if version::satisfies(&pong.version, PLUGIN_VERSION_MINIMUM) {
            return Ok(());
        }

        Err(SessionError::UpdateRequired {
            version: pong.version,
        })
    }
}
