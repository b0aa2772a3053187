//! Session context: the bearer token, where it is persisted, and who is told
//! when it changes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::error::{Error, Result};

/// Fixed name of the persisted token entry.
pub const TOKEN_KEY: &str = "token";

/// Durable storage for the bearer token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the persisted token, if any.
    async fn load(&self) -> Result<Option<String>>;

    /// Persist a token, replacing any previous one.
    async fn save(&self, token: &str) -> Result<()>;

    /// Remove the persisted token. Removing a missing token is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Session store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.lock().await = None;
        Ok(())
    }
}

/// Session store backed by a single plain-text file named [`TOKEN_KEY`].
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the token as `<dir>/token`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Session(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Session(format!("failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|e| Error::Session(format!("failed to write {}: {}", self.path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = tokio::fs::set_permissions(&self.path, perms).await {
                tracing::warn!("Could not restrict permissions on {}: {}", self.path.display(), e);
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Session(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Authentication state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Session transitions, published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The backend rejected the credential. Consumers should send the user
    /// back to login.
    Expired,
}

/// The session context held by a gateway client.
///
/// Reads happen at request-construction time. Writes go through
/// [`Session::establish`] on login, [`Session::clear`] on logout and
/// [`Session::expire`] when the backend rejects the token.
pub struct Session {
    store: Arc<dyn SessionStore>,
    token: RwLock<Option<String>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// An empty session over the given store. Nothing is loaded.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            store,
            token: RwLock::new(None),
            events,
        }
    }

    /// A session primed with whatever token the store already holds.
    pub async fn restore(store: Arc<dyn SessionStore>) -> Result<Self> {
        let token = store.load().await?;
        if token.is_some() {
            tracing::debug!("Restored persisted session");
        }
        let session = Self::new(store);
        *session.token.write().await = token;
        Ok(session)
    }

    /// Current bearer token, if authenticated.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn state(&self) -> SessionState {
        if self.token.read().await.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await == SessionState::Authenticated
    }

    /// Subscribe to session transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Store a freshly issued token. Persists first; on a storage failure the
    /// in-memory state is left untouched.
    pub(crate) async fn establish(&self, token: &str) -> Result<()> {
        let mut guard = self.token.write().await;
        self.store.save(token).await?;
        *guard = Some(token.to_string());
        drop(guard);

        tracing::info!("Session established");
        self.publish(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Drop the token and tell subscribers why.
    ///
    /// The in-memory token is always cleared, even if the store cannot be
    /// updated; the storage error is returned afterwards.
    pub(crate) async fn clear(&self, reason: SessionEvent) -> Result<()> {
        let mut guard = self.token.write().await;
        *guard = None;
        let persisted = self.store.clear().await;
        drop(guard);

        self.publish(reason);
        persisted
    }

    /// End the session because the backend rejected `sent`, the token the
    /// rejected request carried.
    ///
    /// Only clears if the session still holds that token: a rejection of an
    /// older credential must not wipe a session established since. Returns
    /// whether the session was cleared. An already-empty session publishes
    /// nothing.
    pub(crate) async fn expire(&self, sent: Option<&str>) -> Result<bool> {
        let mut guard = self.token.write().await;
        match guard.as_deref() {
            Some(current) if Some(current) == sent => {}
            Some(_) => {
                tracing::debug!("Ignoring rejection of a superseded token");
                return Ok(false);
            }
            None => return Ok(false),
        }
        *guard = None;
        let persisted = self.store.clear().await;
        drop(guard);

        self.publish(SessionEvent::Expired);
        persisted.map(|()| true)
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
