//! Credential persistence.

use std::fmt;

use plugin_session_core::StoreError;

use super::Session;

const PLEX_TOKEN: &str = "plexToken";
const CHANNEL_TOKEN: &str = "channelToken";
const CHANNEL_TOKEN_EXPIRY: &str = "channelTokenExpiry";

/// Credentials held by a session. These are the only persisted fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Long-lived account token for direct resource fetches.
    pub plex_token: Option<String>,
    /// Channel token for RPC calls.
    pub channel_token: Option<String>,
    /// Advisory expiry marker for the channel token.
    pub channel_token_expiry: Option<String>,
}

impl Credentials {
    fn attributes(&self) -> [(&'static str, Option<&String>); 3] {
        [
            (PLEX_TOKEN, self.plex_token.as_ref()),
            (CHANNEL_TOKEN, self.channel_token.as_ref()),
            (CHANNEL_TOKEN_EXPIRY, self.channel_token_expiry.as_ref()),
        ]
    }

    fn attributes_mut(&mut self) -> [(&'static str, &mut Option<String>); 3] {
        [
            (PLEX_TOKEN, &mut self.plex_token),
            (CHANNEL_TOKEN, &mut self.channel_token),
            (CHANNEL_TOKEN_EXPIRY, &mut self.channel_token_expiry),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("Credentials")
            .field("plex_token", &redact(&self.plex_token))
            .field("channel_token", &redact(&self.channel_token))
            .field("channel_token_expiry", &self.channel_token_expiry)
            .finish()
    }
}

/// Identifier credentials are persisted under. Empty counts as unset.
fn persistence_namespace(identifier: Option<&str>) -> Option<&str> {
    identifier.filter(|id| !id.is_empty())
}

/// Store key for a credential attribute of `identifier`.
fn attribute_key(identifier: &str, name: &str) -> String {
    format!("server.{identifier}.{name}")
}

impl Session {
    /// Restore credentials from the store.
    ///
    /// Attributes missing from the store leave the current value untouched.
    /// No-op without a server identifier.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let Some(identifier) = persistence_namespace(self.identifier.as_deref()) else {
            return Ok(());
        };

        for (name, slot) in self.credentials.attributes_mut() {
            if let Some(value) = self.store.get(&attribute_key(identifier, name))? {
                *slot = Some(value);
            }
        }

        Ok(())
    }

    /// Write credentials to the store.
    ///
    /// Unset attributes are removed so a later `load()` leaves them alone.
    /// No-op without a server identifier.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(identifier) = persistence_namespace(self.identifier.as_deref()) else {
            return Ok(());
        };

        for (name, value) in self.credentials.attributes() {
            let key = attribute_key(identifier, name);
            match value {
                Some(value) => self.store.set(&key, value)?,
                None => self.store.remove(&key)?,
            }
        }

        tracing::debug!(server = identifier, "Credentials saved");
        Ok(())
    }
}
