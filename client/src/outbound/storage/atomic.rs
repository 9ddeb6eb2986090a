//! Atomic replacement of small state files.
//!
//! Contents go to a hidden temporary file in the same directory, which is
//! then renamed over the target, so readers see either the old file or the
//! new one.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
///
/// `file_name` must be a bare name; nested paths are rejected.
pub(crate) fn write_atomic(dir: &Dir, file_name: &str, contents: &[u8]) -> io::Result<()> {
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{file_name}' is not a bare file name"),
        ));
    }
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{suffix}.{counter}", std::process::id());

    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }
    drop(dir.open(".").and_then(|parent| parent.sync_all()));
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempStateDir;

    #[test]
    fn replaces_existing_contents_without_leftovers() {
        let state = TempStateDir::new().expect("temp dir");
        let dir = state.open().expect("open dir");

        write_atomic(&dir, "state.json", b"first").expect("first write");
        write_atomic(&dir, "state.json", b"second").expect("second write");

        assert_eq!(dir.read_to_string("state.json").expect("read"), "second");
        let names: Vec<String> = dir
            .entries()
            .expect("list")
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        assert_eq!(names, vec!["state.json".to_owned()]);
    }

    #[test]
    fn rejects_nested_paths() {
        let state = TempStateDir::new().expect("temp dir");
        let dir = state.open().expect("open dir");
        let err = write_atomic(&dir, "nested/state.json", b"x").expect_err("nested path");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
