//! The create draft and pending-update bookkeeping shared with the editor.

use std::sync::Mutex;

use tracing::warn;

use super::ports::{MirrorKey, PersistentMirror};
use super::{EmployeeRecord, FieldMessages, canonical, lock};

/// Editor-facing state owned by the directory service.
///
/// `new_employee` is the create-mode draft. `data_changed` and
/// `updated_data` track an unsaved update-mode edit; `message` holds field
/// messages for the form to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeDraft {
    /// Record being composed in create mode.
    pub new_employee: EmployeeRecord,
    /// Whether an update-mode edit has not been submitted yet.
    pub data_changed: bool,
    /// Latest update-mode record awaiting submission.
    pub updated_data: Option<EmployeeRecord>,
    /// Field messages to show next to the inputs.
    pub message: Option<FieldMessages>,
}

impl EmployeeDraft {
    /// Rebuild the pending-update state from the mirror after a reload.
    ///
    /// Missing or unreadable entries fall back to the defaults; the create
    /// draft always starts empty.
    pub fn restore_from<M: PersistentMirror + ?Sized>(mirror: &M) -> Self {
        let data_changed = match mirror.get(MirrorKey::DataChanged) {
            Ok(Some(raw)) => canonical::decode::<bool>(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "ignoring malformed dataChanged flag");
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "mirror unavailable while restoring dataChanged");
                false
            }
        };
        let updated_data = match mirror.get(MirrorKey::UpdatedData) {
            Ok(Some(raw)) => canonical::decode::<Option<EmployeeRecord>>(&raw)
                .unwrap_or_else(|err| {
                    warn!(error = %err, "ignoring malformed updatedData entry");
                    None
                }),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "mirror unavailable while restoring updatedData");
                None
            }
        };

        Self {
            data_changed,
            updated_data,
            ..Self::default()
        }
    }

    /// Replace the create draft with an empty record.
    pub fn reset_new_employee(&mut self) {
        self.new_employee = EmployeeRecord::empty();
    }

    /// Forget the pending update and any field messages.
    pub fn clear_pending(&mut self) {
        self.data_changed = false;
        self.updated_data = None;
        self.message = None;
    }
}

/// Shared handle to an [`EmployeeDraft`].
///
/// Guards are held only for the duration of the closure passed to
/// [`DraftStore::with`] and never across an `.await`.
#[derive(Debug, Default)]
pub struct DraftStore {
    inner: Mutex<EmployeeDraft>,
}

impl DraftStore {
    /// Wrap an initial draft.
    pub fn new(draft: EmployeeDraft) -> Self {
        Self {
            inner: Mutex::new(draft),
        }
    }

    /// Run `f` with exclusive access to the draft.
    pub fn with<R>(&self, f: impl FnOnce(&mut EmployeeDraft) -> R) -> R {
        let mut guard = lock(&self.inner);
        f(&mut guard)
    }

    /// Copy of the current draft.
    pub fn snapshot(&self) -> EmployeeDraft {
        lock(&self.inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmployeeId;
    use crate::domain::ports::{MirrorError, MockPersistentMirror};

    fn mirror_with(data_changed: Option<&'static str>, updated: Option<String>) -> MockPersistentMirror {
        let mut mirror = MockPersistentMirror::new();
        mirror.expect_get().returning(move |key| {
            Ok(match key {
                MirrorKey::DataChanged => data_changed.map(str::to_owned),
                MirrorKey::UpdatedData => updated.clone(),
                MirrorKey::EmployeeData => None,
            })
        });
        mirror
    }

    #[test]
    fn restore_reads_flag_and_pending_record() {
        let record = EmployeeRecord {
            id: Some(EmployeeId::new("AB1234")),
            city: "Oslo".to_owned(),
            ..EmployeeRecord::empty()
        };
        let raw = canonical::encode(&record).expect("encode");
        let draft = EmployeeDraft::restore_from(&mirror_with(Some("true"), Some(raw)));

        assert!(draft.data_changed);
        assert_eq!(draft.updated_data, Some(record));
        assert_eq!(draft.new_employee, EmployeeRecord::empty());
    }

    #[test]
    fn restore_tolerates_null_and_garbage() {
        let draft =
            EmployeeDraft::restore_from(&mirror_with(Some("maybe"), Some("null".to_owned())));
        assert!(!draft.data_changed);
        assert_eq!(draft.updated_data, None);
    }

    #[test]
    fn restore_falls_back_when_mirror_fails() {
        let mut mirror = MockPersistentMirror::new();
        mirror
            .expect_get()
            .returning(|_| Err(MirrorError::unavailable("storage disabled")));
        assert_eq!(EmployeeDraft::restore_from(&mirror), EmployeeDraft::default());
    }

    #[test]
    fn clear_pending_keeps_create_draft() {
        let mut draft = EmployeeDraft {
            new_employee: EmployeeRecord {
                first_name: "Ada".to_owned(),
                ..EmployeeRecord::empty()
            },
            data_changed: true,
            updated_data: Some(EmployeeRecord::empty()),
            message: Some(FieldMessages::single("email", "taken")),
        };
        draft.clear_pending();

        assert!(!draft.data_changed);
        assert!(draft.updated_data.is_none());
        assert!(draft.message.is_none());
        assert_eq!(draft.new_employee.first_name, "Ada");
    }

    #[test]
    fn store_mutations_are_visible_in_snapshots() {
        let store = DraftStore::default();
        store.with(|draft| draft.data_changed = true);
        assert!(store.snapshot().data_changed);
    }
}
