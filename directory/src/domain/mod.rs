//! Domain primitives, services and ports.
//!
//! Purpose: hold the edit-state rules of the employee directory. Records and
//! field types live in `employee`; the edit session, field bindings and
//! directory workflows are services over the ports in [`ports`].
//!
//! Public surface:
//! - EmployeeRecord / SkillRecord: records exchanged with the backend.
//! - EditSessionService: reconciles the edit buffer with the mirror.
//! - FieldBinding: per-field get/set routed by edit mode.
//! - EmployeeDirectoryService: remote list and CRUD workflows.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod canonical;
mod directory_service;
mod draft;
mod edit_session;
mod employee;
mod error;
mod field_binding;
mod filter;
pub mod ports;
mod validation;

pub use self::canonical::CanonicalError;
pub use self::directory_service::{
    EMAIL_TAKEN_MESSAGE, EmployeeDirectoryService, ListQuery, dedupe_skills_by_name,
};
pub use self::draft::{DraftStore, EmployeeDraft};
pub use self::edit_session::{
    EditMode, EditSession, EditSessionService, ReconcileOutcome, RejectionReason, SessionState,
    WriteOutcome,
};
pub use self::employee::{
    CountrySelection, EmployeeField, EmployeeId, EmployeeRecord, FieldValue, SkillId,
    SkillRecord, ValueKind, ValueKindMismatch,
};
pub use self::error::{DirectoryError, MissingEmployeeId, SessionError};
pub use self::field_binding::FieldBinding;
pub use self::filter::EmployeeFilter;
pub use self::validation::{FieldMessages, field_has_error, validate_phone_number};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
