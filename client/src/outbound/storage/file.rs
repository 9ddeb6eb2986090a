//! Snapshot store backed by a JSON file in the state directory.

use std::io;

use cap_std::fs::Dir;
use tracing::debug;

use super::atomic::write_atomic;
use crate::domain::UserSnapshot;
use crate::domain::ports::{SESSION_SNAPSHOT_KEY, SnapshotStore, SnapshotStoreError};

/// Persists the user snapshot as `portal_user.json`.
pub struct FileSnapshotStore {
    dir: Dir,
    file_name: String,
}

impl FileSnapshotStore {
    /// Store the snapshot inside `dir`.
    #[must_use]
    pub fn new(dir: Dir) -> Self {
        Self {
            dir,
            file_name: format!("{SESSION_SNAPSHOT_KEY}.json"),
        }
    }

    /// Name of the snapshot file inside the state directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<UserSnapshot>, SnapshotStoreError> {
        let text = match self.dir.read_to_string(&self.file_name) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SnapshotStoreError::io(err.to_string())),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| SnapshotStoreError::decode(err.to_string()))
    }

    fn save(&self, snapshot: &UserSnapshot) -> Result<(), SnapshotStoreError> {
        let text = serde_json::to_string_pretty(snapshot)
            .map_err(|err| SnapshotStoreError::encode(err.to_string()))?;
        write_atomic(&self.dir, &self.file_name, text.as_bytes())
            .map_err(|err| SnapshotStoreError::io(err.to_string()))?;
        debug!(file = %self.file_name, "session snapshot saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotStoreError> {
        match self.dir.remove_file(&self.file_name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SnapshotStoreError::io(err.to_string())),
        }
    }
}
