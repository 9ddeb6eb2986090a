//! Snapshot store adapters and the state directory they share.

mod atomic;
mod file;
mod memory;

pub(crate) use atomic::write_atomic;
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;

/// Create `path` if needed and open it as a capability directory.
///
/// # Errors
///
/// Returns the I/O error when the directory cannot be created or opened.
pub fn open_state_dir(path: &Utf8Path) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(path, ambient_authority())?;
    Dir::open_ambient_dir(path, ambient_authority())
}
