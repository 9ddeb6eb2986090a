//! Session cache: the logged-in user's snapshot in memory and in storage.
//!
//! The snapshot is a hint, not proof of a live session; the backend remains
//! the authority and may reject the credential at any time.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, warn};

use super::error::RequestError;
use super::ports::{SnapshotStore, SnapshotStoreError};
use super::user::{UserRole, UserSnapshot};

/// Errors raised by session-aware operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The backend call failed.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The snapshot could not be persisted or cleared.
    #[error(transparent)]
    Store(#[from] SnapshotStoreError),
    /// The operation needs a logged-in user and there is none.
    #[error("not logged in")]
    NotAuthenticated,
}

impl SessionError {
    /// The underlying request error, when the backend call failed.
    #[must_use]
    pub const fn request(&self) -> Option<&RequestError> {
        match self {
            Self::Request(error) => Some(error),
            _ => None,
        }
    }
}

/// Outcome of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The current user may proceed.
    Allow,
    /// No user, or the user's role does not match the route.
    RedirectToLogin,
}

/// In-memory session state backed by a [`SnapshotStore`].
///
/// Only login, logout and an unauthorized response mutate the state.
pub struct SessionState<S> {
    store: S,
    current: RwLock<Option<UserSnapshot>>,
}

impl<S: SnapshotStore> SessionState<S> {
    /// Start with no user, ignoring anything persisted.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Start from whatever the store holds, without contacting the backend.
    ///
    /// A snapshot that cannot be decoded is discarded; an unreadable store
    /// leaves the session empty.
    #[must_use]
    pub fn restore(store: S) -> Self {
        let restored = match store.load() {
            Ok(snapshot) => snapshot,
            Err(err @ SnapshotStoreError::Decode { .. }) => {
                warn!(error = %err, "discarding unreadable session snapshot");
                if let Err(clear_err) = store.clear() {
                    warn!(error = %clear_err, "failed to remove unreadable session snapshot");
                }
                None
            }
            Err(err) => {
                warn!(error = %err, "session snapshot unavailable; starting logged out");
                None
            }
        };
        debug!(restored = restored.is_some(), "session restored");
        Self {
            store,
            current: RwLock::new(restored),
        }
    }

    /// Snapshot of the logged-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<UserSnapshot> {
        self.read().clone()
    }

    /// Whether a snapshot is cached.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Role of the cached user.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        self.read().as_ref().map(UserSnapshot::role)
    }

    /// Cache `snapshot` in memory and persist it.
    ///
    /// # Errors
    ///
    /// Returns the store error when persisting fails; the in-memory copy is
    /// kept regardless.
    pub fn set(&self, snapshot: UserSnapshot) -> Result<(), SnapshotStoreError> {
        let persisted = self.store.save(&snapshot);
        *self.write() = Some(snapshot);
        persisted
    }

    /// Drop the in-memory snapshot and remove the persisted one.
    ///
    /// # Errors
    ///
    /// Returns the store error when removal fails; memory is cleared
    /// regardless.
    pub fn clear(&self) -> Result<(), SnapshotStoreError> {
        *self.write() = None;
        self.store.clear()
    }

    /// Route guard. `required` of `None` means any logged-in user.
    ///
    /// # Examples
    /// ```
    /// use portal_client::domain::{RouteDecision, SessionState, UserRole, UserSnapshot};
    /// use portal_client::outbound::storage::MemorySnapshotStore;
    /// use serde_json::json;
    ///
    /// let session = SessionState::new(MemorySnapshotStore::default());
    /// assert_eq!(session.authorize(None), RouteDecision::RedirectToLogin);
    ///
    /// let snapshot = UserSnapshot::from_value(json!({"role": "STAFF"})).expect("snapshot");
    /// session.set(snapshot).expect("stored");
    /// assert_eq!(session.authorize(Some(UserRole::Staff)), RouteDecision::Allow);
    /// assert_eq!(session.authorize(Some(UserRole::Admin)), RouteDecision::RedirectToLogin);
    /// ```
    #[must_use]
    pub fn authorize(&self, required: Option<UserRole>) -> RouteDecision {
        match (self.role(), required) {
            (Some(role), Some(expected)) if role == expected => RouteDecision::Allow,
            (Some(_), None) => RouteDecision::Allow,
            _ => RouteDecision::RedirectToLogin,
        }
    }

    /// Backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<UserSnapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<UserSnapshot>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
