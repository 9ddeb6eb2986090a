//! Port for the client-local copy of the logged-in user.
//!
//! The snapshot answers "who is logged in" at start-up without a network
//! call. It is a hint, never proof of a live session.

use crate::domain::UserSnapshot;

use super::define_port_error;

/// Fixed storage key under which the user snapshot is persisted.
pub const SESSION_SNAPSHOT_KEY: &str = "portal_user";

define_port_error! {
    /// Errors raised by snapshot store adapters.
    pub enum SnapshotStoreError {
        /// The underlying storage could not be read or written.
        Io {
            /// Description of the storage failure.
            message: String,
        } => "snapshot storage failed: {message}",
        /// A stored snapshot exists but cannot be decoded.
        Decode {
            /// Description of the decoding failure.
            message: String,
        } => "stored snapshot is unreadable: {message}",
        /// The snapshot could not be serialized for storage.
        Encode {
            /// Description of the encoding failure.
            message: String,
        } => "snapshot could not be serialized: {message}",
    }
}

/// Persistent storage for a single user snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted snapshot, if any.
    fn load(&self) -> Result<Option<UserSnapshot>, SnapshotStoreError>;

    /// Persist `snapshot`, replacing any previous one.
    fn save(&self, snapshot: &UserSnapshot) -> Result<(), SnapshotStoreError>;

    /// Remove the persisted snapshot. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SnapshotStoreError>;
}
