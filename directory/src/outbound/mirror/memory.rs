//! Process-local mirror.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::lock;
use crate::domain::ports::{MirrorError, MirrorKey, PersistentMirror};

/// Mirror that keeps entries in memory for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryMirror {
    entries: Mutex<BTreeMap<MirrorKey, String>>,
}

impl InMemoryMirror {
    /// Empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<MirrorKey, String> {
        lock(&self.entries).clone()
    }
}

impl PersistentMirror for InMemoryMirror {
    fn get(&self, key: MirrorKey) -> Result<Option<String>, MirrorError> {
        Ok(lock(&self.entries).get(&key).cloned())
    }

    fn set(&self, key: MirrorKey, value: &str) -> Result<(), MirrorError> {
        lock(&self.entries).insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: MirrorKey) -> Result<(), MirrorError> {
        lock(&self.entries).remove(&key);
        Ok(())
    }
}
