//! Transport client trait.

use async_trait::async_trait;
use plugin_session_core::TransportError;

use crate::protocol::{FunctionCall, RawResponse};

/// Performs plugin function calls over the messaging endpoint.
///
/// Implement this trait to plug in the actual network client. A returned
/// `Ok` means the server answered, whatever the answer says.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a function call and return the raw response payload.
    async fn call_function(&self, call: FunctionCall) -> Result<RawResponse, TransportError>;
}
