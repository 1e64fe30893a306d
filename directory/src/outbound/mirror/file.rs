//! Durable mirror storing one file per key.
//!
//! Entries live in a capability directory. Writes go to a hidden temporary
//! file in the same directory and are renamed over the target, so a reader
//! never observes a partially written entry.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::{MirrorError, MirrorKey, PersistentMirror};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mirror backed by files in a directory.
#[derive(Debug)]
pub struct FileMirror {
    dir: Dir,
}

impl FileMirror {
    /// Open (creating if needed) the mirror directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Unavailable`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> Result<Self, MirrorError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .and_then(|()| Dir::open_ambient_dir(path, ambient_authority()))
            .map(Self::from_dir)
            .map_err(|err| MirrorError::unavailable(format!("{path}: {err}")))
    }

    /// Use an already opened directory.
    pub fn from_dir(dir: Dir) -> Self {
        Self { dir }
    }
}

impl PersistentMirror for FileMirror {
    fn get(&self, key: MirrorKey) -> Result<Option<String>, MirrorError> {
        match self.dir.read_to_string(key.as_str()) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(MirrorError::read(key.as_str(), err.to_string())),
        }
    }

    fn set(&self, key: MirrorKey, value: &str) -> Result<(), MirrorError> {
        write_atomic(&self.dir, key.as_str(), value)
            .map_err(|err| MirrorError::write(key.as_str(), err.to_string()))
    }

    fn remove(&self, key: MirrorKey) -> Result<(), MirrorError> {
        match self.dir.remove_file(key.as_str()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MirrorError::write(key.as_str(), err.to_string())),
        }
    }
}

fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> io::Result<()> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{suffix}.{counter}", std::process::id());

    if let Err(err) = write_temp_file(dir, &tmp_name, contents) {
        discard(dir, &tmp_name);
        return Err(err);
    }
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        discard(dir, &tmp_name);
        return Err(err);
    }
    sync_directory(dir);
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
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

fn discard(dir: &Dir, tmp_name: &str) {
    if dir.remove_file(tmp_name).is_err() {
        // The temp file may never have been created.
    }
}

fn sync_directory(dir: &Dir) {
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Directory sync is best-effort.
    }
}
