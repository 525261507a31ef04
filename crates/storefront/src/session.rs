//! Locally persisted session state.
//!
//! A small key/value document survives restarts: the generated anonymous
//! session id, the login flag (with the signed-in user's id) and whether the
//! first-order popup has been shown. Bearer tokens are never written to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bazaar_core::{Owner, SessionId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors reading or writing the persisted state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The persisted document. Unknown keys are ignored; missing keys default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionState {
    pub session_id: Option<SessionId>,
    pub logged_in: bool,
    pub user_id: Option<UserId>,
    pub seen_first_order_popup: bool,
}

/// Where session state is kept.
pub trait LocalStore: Send + Sync {
    /// Load the stored state, or the default when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if stored state exists but cannot be read.
    fn load(&self) -> Result<SessionState, SessionError>;

    /// Replace the stored state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStore for FileStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionState::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        // Write then rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: std::sync::Mutex<SessionState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            state: std::sync::Mutex::new(state),
        }
    }
}

impl LocalStore for MemoryStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        Ok(self
            .state
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |s| s.clone()))
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        match self.state.lock() {
            Ok(mut guard) => *guard = state.clone(),
            Err(poisoned) => *poisoned.into_inner() = state.clone(),
        }
        Ok(())
    }
}

/// Live session state backed by a [`LocalStore`].
///
/// Every change is written through immediately.
pub struct Session {
    store: Arc<dyn LocalStore>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Load the session from `store`.
    ///
    /// An unreadable store is logged and replaced with a fresh session rather
    /// than failing startup.
    pub fn open(store: Arc<dyn LocalStore>) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable session state");
            SessionState::default()
        });
        Self {
            store,
            state: Mutex::new(state),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Who owns the cart and wishlist right now.
    ///
    /// Signed-in customers own by user id. Otherwise a session id is generated
    /// on first use and persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if a newly generated session id cannot be persisted.
    pub async fn owner(&self) -> Result<Owner, SessionError> {
        let mut state = self.state.lock().await;
        if state.logged_in
            && let Some(user_id) = state.user_id
        {
            return Ok(Owner::User(user_id));
        }
        if let Some(session_id) = state.session_id {
            return Ok(Owner::Session(session_id));
        }

        let session_id = SessionId::generate();
        state.session_id = Some(session_id);
        self.store.save(&state)?;
        tracing::debug!(session_id = %session_id, "Generated session id");
        Ok(Owner::Session(session_id))
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.lock().await.logged_in
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn mark_logged_in(&self, user_id: UserId) -> Result<(), SessionError> {
        self.update(|s| {
            s.logged_in = true;
            s.user_id = Some(user_id);
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted.
    pub async fn mark_logged_out(&self) -> Result<(), SessionError> {
        self.update(|s| {
            s.logged_in = false;
            s.user_id = None;
        })
        .await
    }

    /// Whether to show the first-order popup, recording that it was shown.
    ///
    /// Returns `true` exactly once per persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub async fn take_first_order_popup(&self) -> Result<bool, SessionError> {
        let mut state = self.state.lock().await;
        if state.seen_first_order_popup {
            return Ok(false);
        }
        state.seen_first_order_popup = true;
        self.store.save(&state)?;
        Ok(true)
    }

    async fn update(&self, change: impl FnOnce(&mut SessionState)) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        change(&mut state);
        self.store.save(&state)
    }
}
