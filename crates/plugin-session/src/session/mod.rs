//! Plugin server session.

mod credentials;
mod gate;
mod rpc;

use std::{fmt, sync::Arc};

use plugin_session_core::{
    ACCOUNT_TOKEN_HEADER, Connection, ConnectionManager, ConnectionManagerFactory,
    CredentialStore, Method, ResourceRequest, ResourceResponse, ServerDescriptor,
};
use plugin_session_transport::Transport;

pub use credentials::Credentials;

use crate::{
    auth::Authenticator,
    error::{AuthenticateError, BuildError, GetError, SessionError},
};

/// Collaborators a session is built with.
#[derive(Clone)]
pub struct SessionDeps {
    /// Client used for RPC calls.
    pub transport: Arc<dyn Transport>,
    /// Credential store shared between sessions.
    pub store: Arc<dyn CredentialStore>,
    /// Authentication handshake.
    pub authenticator: Arc<dyn Authenticator>,
    /// Builds the session's connection manager.
    pub connections: Arc<dyn ConnectionManagerFactory>,
}

/// One remote plugin server: identity, credentials and call surface.
///
/// Lifecycle operations take `&mut self`, so at most one of them is in
/// flight per session.
pub struct Session {
    name: Option<String>,
    identifier: Option<String>,
    plugin_version: Option<String>,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    authenticator: Arc<dyn Authenticator>,
    connection_manager: Box<dyn ConnectionManager>,
    current: Option<Arc<dyn Connection>>,
    error: Option<SessionError>,
}

impl Session {
    /// Create a session with no identity and no connection candidates.
    ///
    /// Credential persistence is a no-op for such a session.
    #[must_use]
    pub fn new(deps: SessionDeps) -> Self {
        let connection_manager = deps.connections.build(None, Vec::new());
        Self::assemble(deps, connection_manager)
    }

    /// Build a session from a server listing entry and restore its
    /// persisted credentials.
    ///
    /// # Errors
    /// Returns error if a connection entry cannot be addressed or the
    /// credential store cannot be read.
    pub fn from_descriptor(descriptor: ServerDescriptor, deps: SessionDeps) -> Result<Self, BuildError> {
        let candidates = descriptor.candidates()?;
        let connection_manager = deps
            .connections
            .build(descriptor.client_identifier.as_deref(), candidates);

        let mut session = Self::assemble(deps, connection_manager);
        session.name = descriptor.name;
        session.identifier = descriptor.client_identifier;
        session.credentials.plex_token = descriptor.access_token;

        session.load()?;

        tracing::debug!(
            server = session.identifier.as_deref().unwrap_or("-"),
            candidates = session.connection_manager.candidates().len(),
            "Session created"
        );

        Ok(session)
    }

    fn assemble(deps: SessionDeps, connection_manager: Box<dyn ConnectionManager>) -> Self {
        Self {
            name: None,
            identifier: None,
            plugin_version: None,
            credentials: Credentials::default(),
            transport: deps.transport,
            store: deps.store,
            authenticator: deps.authenticator,
            connection_manager,
            current: None,
            error: None,
        }
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stable server identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Plugin version reported by the last successful version check.
    #[must_use]
    pub fn plugin_version(&self) -> Option<&str> {
        self.plugin_version.as_deref()
    }

    /// Credentials currently held.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Mutable credentials. Changes are persisted by the next `save()`.
    pub const fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    /// Connection candidates the session selects from.
    #[must_use]
    pub fn candidates(&self) -> &[plugin_session_core::ConnectionCandidate] {
        self.connection_manager.candidates()
    }

    /// Connection selected by the last successful `connect()`.
    #[must_use]
    pub fn current_connection(&self) -> Option<&Arc<dyn Connection>> {
        self.current.as_ref()
    }

    /// Last recorded failure.
    #[must_use]
    pub const fn last_error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Whether a channel token is held.
    ///
    /// The expiry marker is not consulted.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.credentials.channel_token.is_some()
    }

    /// Select a working connection and validate the server behind it.
    ///
    /// The last error is cleared first, then set to the failure if either
    /// step fails.
    ///
    /// # Errors
    /// Returns [`SessionError::Connection`] if no candidate works, or the
    /// version check's failure.
    pub async fn connect(&mut self) -> Result<Arc<dyn Connection>, SessionError> {
        self.error = None;

        let connection = match self.connection_manager.test().await {
            Ok(connection) => connection,
            Err(reason) => {
                tracing::warn!(
                    server = self.identifier.as_deref().unwrap_or("-"),
                    "Unable to connect to server: {reason}"
                );
                return Err(self.record(SessionError::Connection { message: reason }));
            }
        };

        if let Err(error) = self.check().await {
            tracing::warn!(
                server = self.identifier.as_deref().unwrap_or("-"),
                "Server failed validation: {error}"
            );
            return Err(self.record(error));
        }

        tracing::info!(
            server = self.identifier.as_deref().unwrap_or("-"),
            uri = %connection.candidate().uri,
            version = self.plugin_version.as_deref().unwrap_or("-"),
            "Connected"
        );

        self.current = Some(Arc::clone(&connection));
        Ok(connection)
    }

    /// Run the authentication handshake and persist the issued credentials.
    ///
    /// # Errors
    /// Returns [`AuthenticateError::Failed`] if the handshake fails; the
    /// details are recorded as the last error. Returns
    /// [`AuthenticateError::Store`] if the credentials cannot be saved.
    pub async fn authenticate(&mut self) -> Result<(), AuthenticateError> {
        let authenticator = Arc::clone(&self.authenticator);

        match authenticator.authenticate(self).await {
            Ok(grant) => {
                self.credentials.channel_token = Some(grant.token);
                self.credentials.channel_token_expiry = grant.expiry;
                self.save()?;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    server = self.identifier.as_deref().unwrap_or("-"),
                    "Authentication failed: {error}"
                );
                self.error = Some(SessionError::Authentication(error));
                Err(AuthenticateError::Failed)
            }
        }
    }

    /// Fetch a resource over the current connection.
    ///
    /// The method is forced to `GET` and the account token header is merged
    /// into the caller's headers.
    ///
    /// # Errors
    /// Returns [`GetError::NotConnected`] before a successful `connect()`,
    /// or the connection's transport failure.
    pub async fn get(&self, path: &str, request: ResourceRequest) -> Result<ResourceResponse, GetError> {
        let connection = self.current.as_ref().ok_or(GetError::NotConnected)?;

        let mut request = request;
        request.method = Method::Get;

        match &self.credentials.plex_token {
            Some(token) => {
                request
                    .headers
                    .insert(ACCOUNT_TOKEN_HEADER.to_string(), token.clone());
            }
            None => tracing::warn!(
                server = self.identifier.as_deref().unwrap_or("-"),
                "No account token available for {path}"
            ),
        }

        Ok(connection.request(path, request).await?)
    }

    fn record(&mut self, error: SessionError) -> SessionError {
        self.error = Some(error.clone());
        error
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("plugin_version", &self.plugin_version)
            .field("credentials", &self.credentials)
            .field("current", &self.current)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
