//! Core abstractions for plugin server sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `ServerDescriptor` / `ConnectionCandidate` - Server listings and the paths they offer
//! - `version` - Dotted version comparison
//! - Credential store, connection and connection manager traits
//! - Compiled-in messaging protocol constants

pub mod descriptor;
pub mod traits;
pub mod version;

pub use descriptor::{ConnectionCandidate, DescriptorError, OneOrMany, RawConnection, ServerDescriptor};
pub use traits::{
    Connection, ConnectionManager, ConnectionManagerFactory, CredentialStore, Method,
    ResourceRequest, ResourceResponse, StoreError, TransportError,
};

/// Identifier of the plugin that serves the messaging API.
pub const PLUGIN_IDENTIFIER: &str = "com.plexapp.plugins.trakttv";

/// Oldest plugin release this client can talk to.
pub const PLUGIN_VERSION_MINIMUM: &str = "0.9.10.3";

/// Messaging target every function call is addressed to.
pub const MESSAGING_TARGET: &str = "MessageKit:Api";

/// Transport endpoint that dispatches plugin messaging calls.
pub const MESSAGING_ENDPOINT: &str = "/:/plugins/*/messaging";

/// Header carrying the channel token on RPC calls.
pub const CHANNEL_TOKEN_HEADER: &str = "X-Channel-Token";

/// Header carrying the account token on direct resource fetches.
pub const ACCOUNT_TOKEN_HEADER: &str = "X-Plex-Token";

/// Remote function used to probe the plugin version.
pub const PING_FUNCTION: &str = "system.ping";
