//! Wire protocol for plugin messaging calls.

use std::collections::BTreeMap;

use plugin_session_core::{MESSAGING_ENDPOINT, MESSAGING_TARGET, PLUGIN_IDENTIFIER};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Function call sent to the messaging endpoint.
///
/// The function name travels as the first positional argument, ahead of
/// the caller's own arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Transport endpoint path.
    pub endpoint: String,
    /// Plugin the call is addressed to.
    pub plugin: String,
    /// Messaging target inside the plugin.
    pub target: String,
    /// Positional arguments, function name first.
    pub args: Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl FunctionCall {
    /// Create a call to `function` on the plugin's messaging target.
    #[must_use]
    pub fn new(function: &str, args: Vec<Value>, kwargs: Map<String, Value>) -> Self {
        let mut wire_args = Vec::with_capacity(args.len() + 1);
        wire_args.push(Value::String(function.to_string()));
        wire_args.extend(args);

        Self {
            endpoint: MESSAGING_ENDPOINT.to_string(),
            plugin: PLUGIN_IDENTIFIER.to_string(),
            target: MESSAGING_TARGET.to_string(),
            args: wire_args,
            kwargs,
            headers: BTreeMap::new(),
        }
    }

    /// Attach a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Name of the function being called.
    #[must_use]
    pub fn function(&self) -> Option<&str> {
        self.args.first().and_then(Value::as_str)
    }
}

/// Response payload as handed back by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Encoded JSON text.
    Text(String),
    /// Already-structured data (legacy servers).
    Structured(Value),
}

/// Response after normalization, tagged by the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    /// Decoded from encoded text.
    Decoded(Value),
    /// Arrived pre-structured.
    Legacy(Value),
}

impl NormalizedResponse {
    /// Whether the response used the legacy format.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Unwrap the structured payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Decoded(value) | Self::Legacy(value) => value,
        }
    }
}

impl RawResponse {
    /// Decode the payload into structured data.
    ///
    /// # Errors
    /// Returns error if encoded text is not valid JSON.
    pub fn normalize(self) -> Result<NormalizedResponse, serde_json::Error> {
        match self {
            Self::Text(text) => serde_json::from_str(&text).map(NormalizedResponse::Decoded),
            Self::Structured(value) => Ok(NormalizedResponse::Legacy(value)),
        }
    }
}

/// Classified outcome of a structured response.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The `result` field, possibly `null`.
    Result(Value),
    /// The `error` field, possibly `null`.
    Error(Value),
    /// Neither field was present.
    Empty,
}

impl CallOutcome {
    /// Classify a structured response.
    ///
    /// A present `result` wins over `error`. A field explicitly set to
    /// `null` still counts as present.
    #[must_use]
    pub fn classify(response: Value) -> Self {
        let Value::Object(mut fields) = response else {
            return Self::Empty;
        };

        if let Some(result) = fields.remove("result") {
            return Self::Result(result);
        }

        fields.remove("error").map_or(Self::Empty, Self::Error)
    }
}
