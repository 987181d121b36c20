//! Session store: the single source of truth for authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `SessionStore` exists per running client. Every holder (gateway, API
//! wrappers, UI, CLI) shares it by handle; cloning never copies state.
//! Two access patterns are exposed:
//! - [`SessionStore::snapshot`] is a synchronous read with no subscription,
//!   used by the gateway on every outbound request.
//! - [`SessionStore::subscribe`] and [`SessionStore::events`] are reactive,
//!   used by UI layers and by the navigation observer.
//!
//! DESIGN
//! ======
//! State lives in a `watch` channel; transitions are published on a
//! `broadcast` channel. `login` and `logout` are the only mutators. Each write
//! commits to memory, then persists the full state under [`STORAGE_KEY`].
//! Writes are serialized so memory and storage agree on the last write, but
//! they are not versioned: a stale `logout` issued after a fresh `login` wins.
//!
//! ERROR HANDLING
//! ==============
//! State transitions cannot fail. Persistence can; its error is returned to
//! the caller after the in-memory transition has already been applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, watch};

use crate::storage::{MemoryStorage, SessionStorage, StorageError};

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Storage key the session is persisted under.
pub const STORAGE_KEY: &str = "auth-storage";

/// Schema version written next to the persisted state.
pub const PERSIST_VERSION: u32 = 0;

pub(crate) const EVENT_CAPACITY: usize = 64;

// =============================================================================
// SESSION
// =============================================================================

/// Minimal identity of the logged-in user.
///
/// Any other profile fields the backend sends are kept in `extra` and
/// round-trip through persistence untouched. `id` and `nickname` entries in
/// `extra` are dropped on login since they would shadow the typed fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSummary {
    const RESERVED: [&'static str; 2] = ["id", "nickname"];

    #[must_use]
    pub fn new(id: i64, nickname: impl Into<String>) -> Self {
        Self { id, nickname: nickname.into(), extra: Map::new() }
    }

    fn without_reserved_extra(mut self) -> Self {
        self.extra.retain(|key, _| !Self::RESERVED.contains(&key.as_str()));
        self
    }
}

/// Client-held authentication status and identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub is_logged_in: bool,
    pub user: Option<UserSummary>,
    pub access_token: Option<String>,
}

impl Session {
    #[must_use]
    pub fn logged_in(user: UserSummary, token: impl Into<String>) -> Self {
        Self {
            is_logged_in: true,
            user: Some(user.without_reserved_extra()),
            access_token: Some(token.into()),
        }
    }

    /// Token to present as a bearer credential. Empty tokens count as absent.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether the logged-in flag, user and token agree with each other.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.is_logged_in {
            self.user.is_some() && self.bearer_token().is_some()
        } else {
            self.user.is_none() && self.access_token.is_none()
        }
    }
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    state: &'a Session,
    version: u32,
}

#[derive(Deserialize)]
struct Persisted {
    state: Session,
    version: u32,
}

// =============================================================================
// EVENTS
// =============================================================================

/// Why a session was cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to sign out.
    UserRequested,
    /// The backend answered a request with `401 Unauthorized`.
    Unauthorized,
}

/// Transition published after every store write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { revision: u64 },
    Invalidated { revision: u64, reason: LogoutReason },
}

// =============================================================================
// STORE
// =============================================================================

/// Shared handle to the process-wide session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Session>,
    events: broadcast::Sender<SessionEvent>,
    /// Held across the memory commit and the persist so both see the same write order.
    storage: Mutex<Box<dyn SessionStorage>>,
    revision: AtomicU64,
}

impl SessionStore {
    /// Open the store over `storage`, rehydrating any persisted session.
    ///
    /// Absent, unreadable, malformed or inconsistent data yields the
    /// logged-out session.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let initial = rehydrate(&storage);
        let (state, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state,
                events,
                storage: Mutex::new(Box::new(storage)),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Store backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    /// Current session without subscribing to future changes.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Current non-empty access token, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.inner.state.borrow().bearer_token().map(str::to_owned)
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().is_logged_in
    }

    /// Live view of the session for UI layers.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Stream of transitions, starting with the next write.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Number of writes applied since the store was opened.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Replace the session with a logged-in one. The token is not validated;
    /// see [`Gateway::authorize`](crate::Gateway::authorize) for how tokens that cannot travel in a
    /// header are sent.
    ///
    /// # Errors
    ///
    /// Returns the storage error if persisting fails; the in-memory session
    /// is already updated at that point.
    pub fn login(&self, user: UserSummary, token: impl Into<String>) -> Result<(), StorageError> {
        let user_id = user.id;
        let (revision, persisted) =
            self.write(Session::logged_in(user, token), |revision| SessionEvent::LoggedIn { revision });
        tracing::info!(revision, user_id, "session logged in");
        persisted
    }

    /// Reset to the logged-out session and publish [`SessionEvent::Invalidated`].
    ///
    /// Every call publishes one event, including calls on an already
    /// logged-out session.
    ///
    /// # Errors
    ///
    /// Returns the storage error if persisting fails; the in-memory session
    /// is already cleared at that point.
    pub fn logout(&self, reason: LogoutReason) -> Result<(), StorageError> {
        let (revision, persisted) =
            self.write(Session::default(), |revision| SessionEvent::Invalidated { revision, reason });
        tracing::info!(revision, ?reason, "session invalidated");
        persisted
    }

    fn write(&self, next: Session, event: impl FnOnce(u64) -> SessionEvent) -> (u64, Result<(), StorageError>) {
        let storage = self
            .inner
            .storage
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let raw = serde_json::to_string(&PersistedRef { state: &next, version: PERSIST_VERSION });
        self.inner.state.send_replace(next);
        let revision = self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1;

        let persisted = raw
            .map_err(StorageError::from)
            .and_then(|raw| storage.save(STORAGE_KEY, &raw));
        if let Err(e) = &persisted {
            tracing::error!(revision, error = %e, "session persist failed");
        }

        // No receivers is fine; nobody is listening yet.
        let _ = self.inner.events.send(event(revision));
        (revision, persisted)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("is_logged_in", &state.is_logged_in)
            .field("user", &state.user.as_ref().map(|u| u.id))
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

fn rehydrate(storage: &dyn SessionStorage) -> Session {
    let raw = match storage.load(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Session::default(),
        Err(e) => {
            tracing::warn!(error = %e, "session storage unreadable; starting logged out");
            return Session::default();
        }
    };

    match serde_json::from_str::<Persisted>(&raw) {
        Ok(persisted) if persisted.version != PERSIST_VERSION => {
            tracing::warn!(version = persisted.version, "unknown persisted session version; starting logged out");
            Session::default()
        }
        Ok(persisted) if !persisted.state.is_consistent() => {
            tracing::warn!("persisted session is inconsistent; starting logged out");
            Session::default()
        }
        Ok(persisted) => {
            tracing::debug!(is_logged_in = persisted.state.is_logged_in, "session rehydrated");
            persisted.state
        }
        Err(e) => {
            tracing::warn!(error = %e, "persisted session is malformed; starting logged out");
            Session::default()
        }
    }
}
