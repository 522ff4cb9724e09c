//! Authentication handshake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Session, error::AuthError};

/// Channel credentials issued by a successful handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGrant {
    /// Channel token attached to subsequent calls.
    pub token: String,
    /// Expiry marker, stored as reported.
    #[serde(default)]
    pub expiry: Option<String>,
}

impl std::fmt::Debug for ChannelGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelGrant")
            .field("token", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Performs the authentication handshake with a plugin server.
///
/// Implementations may issue calls through `session` (for example with
/// [`Session::call`]); the session applies and persists the returned grant.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate against the server behind `session`.
    async fn authenticate(&self, session: &Session) -> Result<ChannelGrant, AuthError>;
}
