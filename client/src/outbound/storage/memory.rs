//! In-memory snapshot store.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::UserSnapshot;
use crate::domain::ports::{SnapshotStore, SnapshotStoreError};

/// Keeps the serialized snapshot in memory, the way browser storage keeps a
/// string per key. Useful for tests and for one-shot sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    /// Start with raw stored text, which need not be a valid snapshot.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Stored text, exactly as persisted.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<UserSnapshot>, SnapshotStoreError> {
        self.lock()
            .as_deref()
            .map(serde_json::from_str::<UserSnapshot>)
            .transpose()
            .map_err(|err| SnapshotStoreError::decode(err.to_string()))
    }

    fn save(&self, snapshot: &UserSnapshot) -> Result<(), SnapshotStoreError> {
        let text = serde_json::to_string(snapshot)
            .map_err(|err| SnapshotStoreError::encode(err.to_string()))?;
        *self.lock() = Some(text);
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotStoreError> {
        *self.lock() = None;
        Ok(())
    }
}
