//! Server descriptors and connection candidates.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A single value or a list of values.
///
/// Server listings encode a lone connection as a bare object and several
/// connections as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Several values.
    Many(Vec<T>),
    /// A single value.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Normalize into a collection.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(values) => values,
            Self::One(value) => vec![value],
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Descriptor error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Connection entry has neither a uri nor an address")]
    MissingAddress,
}

/// Server entry as published by the server listing.
///
/// Attribute names follow the listing format; the underscore-prefixed
/// aliases are what an XML-to-JSON conversion produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerDescriptor {
    /// Display label.
    #[serde(alias = "_name")]
    pub name: Option<String>,

    /// Stable server identifier.
    #[serde(rename = "clientIdentifier", alias = "_clientIdentifier")]
    pub client_identifier: Option<String>,

    /// Long-lived account token.
    #[serde(rename = "accessToken", alias = "_accessToken")]
    pub access_token: Option<String>,

    /// Raw connection entries.
    #[serde(rename = "Connection")]
    pub connections: OneOrMany<RawConnection>,
}

impl ServerDescriptor {
    /// Convert every raw connection entry into a candidate.
    ///
    /// # Errors
    /// Returns error if an entry cannot be addressed.
    pub fn candidates(&self) -> Result<Vec<ConnectionCandidate>, DescriptorError> {
        self.connections
            .clone()
            .into_vec()
            .into_iter()
            .map(ConnectionCandidate::from_element)
            .collect()
    }
}

/// Raw connection entry from a server listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConnection {
    #[serde(alias = "_protocol")]
    pub protocol: Option<String>,
    #[serde(alias = "_address")]
    pub address: Option<String>,
    #[serde(alias = "_port", deserialize_with = "lenient::port")]
    pub port: Option<u16>,
    #[serde(alias = "_uri")]
    pub uri: Option<String>,
    #[serde(alias = "_local", deserialize_with = "lenient::flag")]
    pub local: Option<bool>,
}

/// One possible network path to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCandidate {
    /// Base URI requests are issued against.
    pub uri: String,
    /// Scheme, `http` unless the entry says otherwise.
    pub protocol: String,
    pub address: Option<String>,
    pub port: Option<u16>,
    /// Whether the path is on the local network.
    pub local: bool,
}

impl ConnectionCandidate {
    /// Build a candidate from a raw listing entry.
    ///
    /// An explicit `uri` wins; otherwise one is assembled from the protocol,
    /// address and port.
    ///
    /// # Errors
    /// Returns error if the entry has neither a uri nor an address.
    pub fn from_element(raw: RawConnection) -> Result<Self, DescriptorError> {
        let protocol = raw.protocol.unwrap_or_else(|| "http".to_string());

        let uri = match (raw.uri, raw.address.as_deref()) {
            (Some(uri), _) if !uri.is_empty() => uri,
            (_, Some(address)) if !address.is_empty() => match raw.port {
                Some(port) => format!("{protocol}://{address}:{port}"),
                None => format!("{protocol}://{address}"),
            },
            _ => return Err(DescriptorError::MissingAddress),
        };

        Ok(Self {
            uri,
            protocol,
            address: raw.address,
            port: raw.port,
            local: raw.local.unwrap_or(false),
        })
    }
}

/// Deserializers for attributes that arrive as strings or as native values.
mod lenient {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Number(u64),
        Text(String),
    }

    pub fn port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match value {
            Some(Scalar::Number(n)) => u16::try_from(n).ok(),
            Some(Scalar::Text(s)) => s.trim().parse().ok(),
            Some(Scalar::Bool(_)) | None => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Scalar>::deserialize(deserializer)?;
        Ok(match value {
            Some(Scalar::Bool(b)) => Some(b),
            Some(Scalar::Number(n)) => Some(n != 0),
            Some(Scalar::Text(s)) => match s.trim() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
            None => None,
        })
    }
}
