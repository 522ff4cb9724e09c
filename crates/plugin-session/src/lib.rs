//! Session lifecycle and remote calls for a plugin server.
//!
//! Provides:
//! - `Session` - Connect, version check, authenticate, `call` and `get`
//! - `Authenticator` trait for the authentication handshake
//! - `SequentialConnectionManager` - First-reachable connection selection
//! - Credential store implementations (memory, JSON file)

pub mod auth;
pub mod connection;
pub mod error;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use auth::{Authenticator, ChannelGrant};
pub use connection::{ConnectionProbe, SequentialConnectionManager};
pub use error::{AuthError, AuthenticateError, BuildError, CallError, GetError, SessionError};
pub use session::{Credentials, Session, SessionDeps};
