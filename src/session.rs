//! Session guard: decides whether management operations may run.
//!
//! Session state is two flat string values (an auth flag and the username)
//! persisted through a [`SessionStore`]. The guard re-reads the store on
//! every check, so state written by another process or console instance is
//! picked up on the next call instead of being cached for the life of the
//! program. Logins and logouts are fanned out as [`SessionEvent`]s over a
//! broadcast channel for anything that wants to react without polling.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::client::CatalogClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Session, SessionEvent};

/// Marker stored as the first line of the session file.
const AUTH_FLAG: &str = "authenticated";

/// Default capacity for the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Persistence for the client-local session.
///
/// Absent or malformed state is `None`, never an error.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

/// Session store writing the two values to a flat file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let mut lines = raw.lines();
        if lines.next()? != AUTH_FLAG {
            return None;
        }
        let username = lines.next()?.trim();
        if username.is_empty() {
            return None;
        }
        Some(Session::new(username))
    }

    fn save(&self, session: &Session) {
        let contents = format!("{AUTH_FLAG}\n{}\n", session.username);
        if let Err(err) = fs::write(&self.path, contents) {
            warn!("failed to persist session to {}: {err}", self.path.display());
        }
    }

    fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                "failed to remove session file {}: {err}",
                self.path.display()
            );
        }
    }
}

/// In-memory store. Tests use one shared instance to simulate session
/// storage visible across tabs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.inner.lock().expect("session store lock poisoned").clone()
    }

    fn save(&self, session: &Session) {
        *self.inner.lock().expect("session store lock poisoned") = Some(session.clone());
    }

    fn clear(&self) {
        *self.inner.lock().expect("session store lock poisoned") = None;
    }
}

/// Broadcast fan-out of session changes.
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to receive all future session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Send an event. Having no subscribers is not an error.
    fn send(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Login-gates the management workflow.
#[derive(Clone)]
pub struct SessionGuard {
    client: CatalogClient,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl SessionGuard {
    pub fn new(client: CatalogClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            store,
            events: SessionEvents::new(),
        }
    }

    /// Whether a persisted session is present. Consults the store on every
    /// call; no network round-trip is made.
    pub fn is_authenticated(&self) -> bool {
        self.store.load().is_some()
    }

    /// Username of the current session, if any.
    pub fn username(&self) -> Option<String> {
        self.store.load().map(|session| session.username)
    }

    /// Subscribe to login/logout events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The current session, or `Unauthorized` for callers gating management
    /// operations.
    pub fn require_session(&self) -> ClientResult<Session> {
        self.store
            .load()
            .ok_or_else(|| ClientError::Unauthorized("log in to manage uploads".to_string()))
    }

    /// Log in against the catalog API and persist the session on success.
    ///
    /// Business failures carry the server's human-readable message;
    /// transport and parse failures surface the generic connectivity error.
    /// Nothing is persisted unless the server reported success.
    pub async fn login(&self, username: &str, password: SecretString) -> ClientResult<Session> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(ClientError::InvalidInput(
                "Username and password required".to_string(),
            ));
        }

        let response = self.client.login(username, &password).await?;
        if !response.success {
            let message = if response.message.is_empty() {
                "Login failed".to_string()
            } else {
                response.message
            };
            return Err(ClientError::LoginFailed(message));
        }

        // Prefer the canonical username echoed by the server.
        let session = Session::new(response.username.as_deref().unwrap_or(username));
        self.store.save(&session);
        info!("logged in as {}", session.username);
        self.events.send(SessionEvent::LoggedIn {
            username: session.username.clone(),
        });
        Ok(session)
    }

    /// Log out: notify the catalog API best-effort, then clear the persisted
    /// session unconditionally.
    pub async fn logout(&self) {
        if let Err(err) = self.client.logout().await {
            warn!("logout call failed (session cleared anyway): {err}");
        }
        self.store.clear();
        self.events.send(SessionEvent::LoggedOut);
        info!("logged out");
    }
}
