//! Per-field accessors used by the editor form.
//!
//! A [`FieldBinding`] pairs one [`EmployeeField`] with the edit session and
//! the create draft. Reads and writes go to the edit buffer while the
//! session is updating an employee and to the draft otherwise.

use super::ports::{PersistentMirror, ViewportLock};
use super::{
    DraftStore, EditSessionService, EmployeeField, FieldValue, SessionError, WriteOutcome,
};

/// Get/set pair for one editor field.
pub struct FieldBinding<'a, M, V> {
    field: EmployeeField,
    session: &'a EditSessionService<M, V>,
    draft: &'a DraftStore,
}

impl<'a, M, V> FieldBinding<'a, M, V>
where
    M: PersistentMirror,
    V: ViewportLock,
{
    /// Bind `field` to a session and draft.
    pub fn new(
        field: EmployeeField,
        session: &'a EditSessionService<M, V>,
        draft: &'a DraftStore,
    ) -> Self {
        Self {
            field,
            session,
            draft,
        }
    }

    /// Field this binding reads and writes.
    pub fn field(&self) -> EmployeeField {
        self.field
    }

    /// Current value shown by the form.
    pub fn get(&self) -> FieldValue {
        self.draft
            .with(|draft| self.session.read_field(draft, self.field))
    }

    /// Store a value typed into the form.
    ///
    /// In update mode a contact number must pass
    /// [`validate_phone_number`](super::validate_phone_number) and a country
    /// must be a [`CountrySelection`](super::CountrySelection). Accepted
    /// values are written through to the persistent mirror.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the mirror write or canonical encoding
    /// fails. Rejected values are reported through [`WriteOutcome`] instead.
    pub fn set(&self, value: FieldValue) -> Result<WriteOutcome, SessionError> {
        self.draft
            .with(|draft| self.session.write_field(draft, self.field, value))
    }
}
