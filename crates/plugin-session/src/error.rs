//! Error types for session lifecycle and calls.

use plugin_session_core::{DescriptorError, StoreError, TransportError};
use serde_json::{Value, json};
use thiserror::Error;

/// Failure of a single remote function call.
///
/// `Application` means the call reached the server and it said no. `Decode`
/// and `Transport` mean no structured answer was obtained.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("Server returned error: {0}")]
    Application(Value),
    #[error("Response carried neither result nor error")]
    Empty,
    #[error("Undecodable response: {0}")]
    Decode(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CallError {
    /// The server answered with an `error` field.
    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Application(_))
    }

    /// The call never produced a structured answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Transport(_))
    }

    /// Payload the call was rejected with.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Application(value) => value.clone(),
            Self::Empty => Value::Null,
            Self::Decode(message) => Value::String(message.clone()),
            Self::Transport(error) => error.payload.clone(),
        }
    }

    /// Transport status code, when one was reported.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(error) => error.status,
            _ => None,
        }
    }
}

/// Authenticator failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Authentication rejected: {0}")]
    Rejected(Value),
    #[error(transparent)]
    Call(#[from] CallError),
}

impl AuthError {
    /// Opaque payload reported by the authenticator.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Rejected(value) => value.clone(),
            Self::Call(error) => error.payload(),
        }
    }
}

/// Failure recorded on a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No candidate produced a working connection.
    #[error("{message}")]
    Connection { message: String },
    /// Server is reachable but its plugin is too old.
    #[error("Plugin update required")]
    UpdateRequired { version: String },
    /// Version probe failed.
    #[error(transparent)]
    Ping(CallError),
    /// Authenticator reported a failure.
    #[error(transparent)]
    Authentication(AuthError),
}

impl SessionError {
    /// Structured payload for observers.
    ///
    /// Connection and version failures render as `{"message": ...}`; call
    /// and authentication failures forward their own payload.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Connection { .. } | Self::UpdateRequired { .. } => {
                json!({ "message": self.to_string() })
            }
            Self::Ping(error) => error.payload(),
            Self::Authentication(error) => error.payload(),
        }
    }
}

/// `authenticate()` failure.
///
/// A rejection carries no details; they are recorded on the session and
/// available through `Session::last_error`.
#[derive(Debug, Error)]
pub enum AuthenticateError {
    #[error("Authentication failed")]
    Failed,
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// `get()` failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GetError {
    #[error("Session has no current connection")]
    NotConnected,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Session construction failure.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
