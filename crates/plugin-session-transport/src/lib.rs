//! Messaging transport for plugin sessions.
//!
//! Provides:
//! - Wire protocol (function call envelope, response normalization)
//! - `Transport` trait implemented by the network client

pub mod client;
pub mod protocol;

pub use client::Transport;
pub use protocol::{CallOutcome, FunctionCall, NormalizedResponse, RawResponse};
