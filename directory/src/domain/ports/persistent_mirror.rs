//! Port for the durable key-value mirror that keeps edit drafts alive.
//!
//! The mirror is a synchronous string store. Three well-known keys hold the
//! edit-session draft; see [`MirrorKey`]. Adapters decide where the strings
//! live (process memory, one file per key, browser storage).

use super::define_port_error;

/// Keys the edit session reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MirrorKey {
    /// Canonical JSON of the record being edited.
    EmployeeData,
    /// `"true"` while the mirrored record has unsaved edits.
    DataChanged,
    /// Canonical JSON of the latest edited record awaiting submission.
    UpdatedData,
}

impl MirrorKey {
    /// Every key, in reset order.
    pub const ALL: [Self; 3] = [Self::EmployeeData, Self::DataChanged, Self::UpdatedData];

    /// Storage name of the key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmployeeData => "employeeData",
            Self::DataChanged => "dataChanged",
            Self::UpdatedData => "updatedData",
        }
    }
}

define_port_error! {
    /// Errors raised by persistent mirror adapters.
    pub enum MirrorError {
        /// The backing store could not be reached.
        Unavailable {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "persistent mirror unavailable: {message}",
        /// Reading a key failed.
        Read {
            /// Mirror key involved.
            key: String,
            /// Adapter-supplied detail.
            message: String,
        } =>
            "failed to read mirror key {key}: {message}",
        /// Writing or removing a key failed.
        Write {
            /// Mirror key involved.
            key: String,
            /// Adapter-supplied detail.
            message: String,
        } =>
            "failed to write mirror key {key}: {message}",
    }
}

/// Synchronous key-value store backing the edit session.
///
/// Removing an absent key must succeed; callers reset keys unconditionally.
#[cfg_attr(test, mockall::automock)]
pub trait PersistentMirror: Send + Sync {
    /// Fetch the stored string for `key`, or `None` when absent.
    fn get(&self, key: MirrorKey) -> Result<Option<String>, MirrorError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: MirrorKey, value: &str) -> Result<(), MirrorError>;

    /// Delete `key`. Succeeds when the key is already absent.
    fn remove(&self, key: MirrorKey) -> Result<(), MirrorError>;
}

/// Fixture implementation that never stores anything.
///
/// Lookups always return `None` and writes are discarded. Use it where the
/// mirror is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePersistentMirror;

impl PersistentMirror for FixturePersistentMirror {
    fn get(&self, _key: MirrorKey) -> Result<Option<String>, MirrorError> {
        Ok(None)
    }

    fn set(&self, _key: MirrorKey, _value: &str) -> Result<(), MirrorError> {
        Ok(())
    }

    fn remove(&self, _key: MirrorKey) -> Result<(), MirrorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MirrorKey::EmployeeData, "employeeData")]
    #[case(MirrorKey::DataChanged, "dataChanged")]
    #[case(MirrorKey::UpdatedData, "updatedData")]
    fn key_names_match_storage_layout(#[case] key: MirrorKey, #[case] expected: &str) {
        assert_eq!(key.as_str(), expected);
    }

    #[test]
    fn fixture_mirror_forgets_writes() {
        let mirror = FixturePersistentMirror;
        mirror
            .set(MirrorKey::EmployeeData, "{}")
            .expect("fixture set should succeed");
        assert_eq!(mirror.get(MirrorKey::EmployeeData).expect("get"), None);
        mirror
            .remove(MirrorKey::EmployeeData)
            .expect("fixture remove should succeed");
    }

    #[test]
    fn write_error_formats_key_and_message() {
        let error = MirrorError::write("employeeData", "disk full");
        assert_eq!(
            error.to_string(),
            "failed to write mirror key employeeData: disk full"
        );
    }
}
