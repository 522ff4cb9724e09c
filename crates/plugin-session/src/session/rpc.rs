//! Remote function calls.

use plugin_session_core::CHANNEL_TOKEN_HEADER;
use plugin_session_transport::{CallOutcome, FunctionCall};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Session;
use crate::error::CallError;

impl Session {
    /// Call a remote function on the plugin's messaging target.
    ///
    /// The channel token, when held, is sent as a header.
    ///
    /// # Errors
    /// Returns [`CallError::Application`] when the server answers with an
    /// `error`, [`CallError::Empty`] when it answers with neither field, and
    /// [`CallError::Decode`] / [`CallError::Transport`] when no structured
    /// answer was obtained.
    pub async fn call(
        &self,
        function: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, CallError> {
        let request_id = Uuid::new_v4();

        let mut request = FunctionCall::new(function, args, kwargs);
        if let Some(token) = &self.credentials.channel_token {
            request = request.with_header(CHANNEL_TOKEN_HEADER, token.as_str());
        }

        tracing::debug!(
            %request_id,
            server = self.identifier.as_deref().unwrap_or("-"),
            args = ?request.args,
            kwargs = ?request.kwargs,
            "Request \"{function}\""
        );

        let response = self
            .transport
            .call_function(request)
            .await?
            .normalize()
            .map_err(|e| CallError::Decode(e.to_string()))?;

        if response.is_legacy() {
            tracing::warn!(%request_id, "Legacy response format returned");
        }

        let response = response.into_value();
        tracing::debug!(%request_id, ?response, "Response");

        match CallOutcome::classify(response) {
            CallOutcome::Result(value) => Ok(value),
            CallOutcome::Error(error) => Err(CallError::Application(error)),
            CallOutcome::Empty => Err(CallError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use plugin_session_core::{MESSAGING_ENDPOINT, MESSAGING_TARGET, PLUGIN_IDENTIFIER, TransportError};
    use plugin_session_transport::RawResponse;
    use serde_json::json;

    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn test_function_name_prepended() {
        let harness = Harness::new();
        let session = harness.session();
        harness.transport.push_text(json!({"result": null}));

        let mut kwargs = Map::new();
        kwargs.insert("limit".to_string(), json!(10));

        session.call("foo", vec![json!(1), json!(2)], kwargs).await.unwrap();

        let calls = harness.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec![json!("foo"), json!(1), json!(2)]);
        assert_eq!(calls[0].kwargs.get("limit"), Some(&json!(10)));
        assert_eq!(calls[0].plugin, PLUGIN_IDENTIFIER);
        assert_eq!(calls[0].target, MESSAGING_TARGET);
        assert_eq!(calls[0].endpoint, MESSAGING_ENDPOINT);
    }

    #[tokio::test]
    async fn test_channel_token_header() {
        let harness = Harness::new();
        let mut session = harness.session();
        harness.transport.push_text(json!({"result": 1}));
        harness.transport.push_text(json!({"result": 2}));

        session.call("a", Vec::new(), Map::new()).await.unwrap();
        session.credentials_mut().channel_token = Some("chan".to_string());
        session.call("b", Vec::new(), Map::new()).await.unwrap();

        let calls = harness.transport.calls();
        assert!(calls[0].headers.is_empty());
        assert_eq!(
            calls[1].headers.get(CHANNEL_TOKEN_HEADER).map(String::as_str),
            Some("chan")
        );
    }

    #[tokio::test]
    async fn test_result() {
        let harness = Harness::new();
        let session = harness.session();
        harness.transport.push_text(json!({"result": 42}));

        assert_eq!(session.call("foo", Vec::new(), Map::new()).await, Ok(json!(42)));
    }

    #[tokio::test]
    async fn test_application_error() {
        let harness = Harness::new();
        let session = harness.session();
        harness.transport.push_text(json!({"error": "bad"}));

        let error = session.call("foo", Vec::new(), Map::new()).await.unwrap_err();
        assert_eq!(error, CallError::Application(json!("bad")));
        assert!(error.is_application());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let harness = Harness::new();
        let session = harness.session();
        harness.transport.push_text(json!({}));

        let error = session.call("foo", Vec::new(), Map::new()).await.unwrap_err();
        assert_eq!(error, CallError::Empty);
        assert_eq!(error.payload(), Value::Null);
    }

    #[tokio::test]
    async fn test_legacy_response_same_outcome() {
        let harness = Harness::new();
        let session = harness.session();
        harness
            .transport
            .push(Ok(RawResponse::Structured(json!({"result": {"ok": true}}))));

        assert_eq!(
            session.call("foo", Vec::new(), Map::new()).await,
            Ok(json!({"ok": true}))
        );
    }

    #[tokio::test]
    async fn test_transport_failure_forwarded() {
        let harness = Harness::new();
        let session = harness.session();
        harness
            .transport
            .push_failure(TransportError::new(json!({"detail": "Bad Gateway"}), Some(502)));

        let error = session.call("foo", Vec::new(), Map::new()).await.unwrap_err();

        assert!(error.is_transport());
        assert_eq!(error.status(), Some(502));
        assert_eq!(error.payload(), json!({"detail": "Bad Gateway"}));
    }

    #[tokio::test]
    async fn test_undecodable_text() {
        let harness = Harness::new();
        let session = harness.session();
        harness
            .transport
            .push(Ok(RawResponse::Text("<html>502</html>".to_string())));

        let error = session.call("foo", Vec::new(), Map::new()).await.unwrap_err();
        assert!(matches!(error, CallError::Decode(_)));
        assert!(error.is_transport());
    }
}
