//! Scripted collaborators for unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use plugin_session_core::{
    Connection, ConnectionCandidate, ConnectionManager, ConnectionManagerFactory, CredentialStore,
    RawConnection, ResourceRequest, ResourceResponse, ServerDescriptor, StoreError, TransportError,
};
use plugin_session_transport::{FunctionCall, RawResponse, Transport};
use serde_json::{Value, json};

use crate::{
    Session, SessionDeps,
    auth::{Authenticator, ChannelGrant},
    error::AuthError,
};

/// `{"result": {"version": ...}}` ping response.
pub fn pong(version: &str) -> Value {
    json!({"result": {"version": version}})
}

/// Transport replaying queued responses and recording every call.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    calls: Mutex<Vec<FunctionCall>>,
}

impl ScriptedTransport {
    pub fn push(&self, response: Result<RawResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_text(&self, response: Value) {
        self.push(Ok(RawResponse::Text(response.to_string())));
    }

    pub fn push_failure(&self, error: TransportError) {
        self.push(Err(error));
    }

    pub fn calls(&self) -> Vec<FunctionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call_function(&self, call: FunctionCall) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response", None)))
    }
}

/// Connection answering every request with `200` and recording it.
#[derive(Debug)]
pub struct StaticConnection {
    candidate: ConnectionCandidate,
    requests: Mutex<Vec<(String, ResourceRequest)>>,
}

impl StaticConnection {
    pub fn new(uri: &str) -> Arc<Self> {
        let candidate = ConnectionCandidate::from_element(RawConnection {
            uri: Some(uri.to_string()),
            ..RawConnection::default()
        })
        .unwrap();

        Arc::new(Self {
            candidate,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<(String, ResourceRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for StaticConnection {
    fn candidate(&self) -> &ConnectionCandidate {
        &self.candidate
    }

    async fn request(
        &self,
        path: &str,
        request: ResourceRequest,
    ) -> Result<ResourceResponse, TransportError> {
        self.requests.lock().unwrap().push((path.to_string(), request));
        Ok(ResourceResponse {
            status: 200,
            body: json!({ "path": path }),
        })
    }
}

type Outcome = Result<Arc<dyn Connection>, String>;

/// Connection manager factory whose managers replay queued outcomes.
#[derive(Default)]
pub struct ScriptedConnections {
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    tests: Arc<AtomicUsize>,
}

impl ScriptedConnections {
    pub fn push_reachable(&self, uri: &str) -> Arc<StaticConnection> {
        let connection = StaticConnection::new(uri);
        let shared: Arc<dyn Connection> = connection.clone();
        self.outcomes.lock().unwrap().push_back(Ok(shared));
        connection
    }

    pub fn push_unreachable(&self, reason: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    /// Number of `test()` calls across all managers.
    pub fn tests(&self) -> usize {
        self.tests.load(Ordering::SeqCst)
    }
}

impl ConnectionManagerFactory for ScriptedConnections {
    fn build(
        &self,
        _server_identifier: Option<&str>,
        candidates: Vec<ConnectionCandidate>,
    ) -> Box<dyn ConnectionManager> {
        Box::new(ScriptedManager {
            candidates,
            outcomes: Arc::clone(&self.outcomes),
            tests: Arc::clone(&self.tests),
        })
    }
}

struct ScriptedManager {
    candidates: Vec<ConnectionCandidate>,
    outcomes: Arc<Mutex<VecDeque<Outcome>>>,
    tests: Arc<AtomicUsize>,
}

#[async_trait]
impl ConnectionManager for ScriptedManager {
    fn candidates(&self) -> &[ConnectionCandidate] {
        &self.candidates
    }

    async fn test(&self) -> Outcome {
        self.tests.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted connection".to_string()))
    }
}

/// Store counting reads and writes.
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingStore {
    /// Insert without counting a write.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every later operation fail with `StoreError::Internal`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Internal("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl CredentialStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.seed(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Authenticator replaying queued outcomes.
#[derive(Default)]
pub struct ScriptedAuthenticator {
    outcomes: Mutex<VecDeque<Result<ChannelGrant, AuthError>>>,
}

impl ScriptedAuthenticator {
    pub fn push(&self, outcome: Result<ChannelGrant, AuthError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn authenticate(&self, _session: &Session) -> Result<ChannelGrant, AuthError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::Rejected(Value::Null)))
    }
}

/// Scripted collaborators wired into sessions.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<RecordingStore>,
    pub authenticator: Arc<ScriptedAuthenticator>,
    pub connections: Arc<ScriptedConnections>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            transport: Arc::default(),
            store: Arc::default(),
            authenticator: Arc::default(),
            connections: Arc::default(),
        }
    }

    pub fn deps(&self) -> SessionDeps {
        SessionDeps {
            transport: self.transport.clone(),
            store: self.store.clone(),
            authenticator: self.authenticator.clone(),
            connections: self.connections.clone(),
        }
    }

    /// Session for server `abc123` with account token `plex-token`.
    pub fn session(&self) -> Session {
        self.session_with_token(Some("plex-token"))
    }

    pub fn session_with_token(&self, access_token: Option<&str>) -> Session {
        Session::from_descriptor(descriptor(access_token), self.deps()).unwrap()
    }
}

/// Listing entry for server `abc123` with one plain and one uri connection.
pub fn descriptor(access_token: Option<&str>) -> ServerDescriptor {
    serde_json::from_value(json!({
        "name": "Living Room",
        "clientIdentifier": "abc123",
        "accessToken": access_token,
        "Connection": [
            {"protocol": "http", "address": "10.0.0.2", "port": "32400", "local": "1"},
            {"uri": "https://example.org:443", "local": "0"}
        ]
    }))
    .unwrap()
}
