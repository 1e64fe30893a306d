//! Persistent mirror adapters.

mod file;
mod memory;

pub use file::FileMirror;
pub use memory::InMemoryMirror;

use crate::domain::ports::{MirrorError, MirrorKey, PersistentMirror};

/// Mirror chosen at start-up from configuration.
#[derive(Debug)]
pub enum ConfiguredMirror {
    /// Entries are lost when the process exits.
    Memory(InMemoryMirror),
    /// Entries are kept on disk.
    File(FileMirror),
}

impl PersistentMirror for ConfiguredMirror {
    fn get(&self, key: MirrorKey) -> Result<Option<String>, MirrorError> {
        match self {
            Self::Memory(mirror) => mirror.get(key),
            Self::File(mirror) => mirror.get(key),
        }
    }

    fn set(&self, key: MirrorKey, value: &str) -> Result<(), MirrorError> {
        match self {
            Self::Memory(mirror) => mirror.set(key, value),
            Self::File(mirror) => mirror.set(key, value),
        }
    }

    fn remove(&self, key: MirrorKey) -> Result<(), MirrorError> {
        match self {
            Self::Memory(mirror) => mirror.remove(key),
            Self::File(mirror) => mirror.remove(key),
        }
    }
}
