//! Temporary state directory for filesystem-backed adapters.

use std::io;
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use tempfile::TempDir;

/// Temporary directory removed on drop, openable as a capability directory.
#[derive(Debug)]
pub struct TempStateDir {
    temp: TempDir,
}

impl TempStateDir {
    /// Create a fresh empty directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    /// Filesystem path of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Open a new handle on the directory.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be opened.
    pub fn open(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(self.temp.path(), ambient_authority())
    }
}
