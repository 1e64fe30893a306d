//! Edit-session service: reconciles the edit buffer with the mirror.
//!
//! The service owns the session state behind a mutex and talks to the
//! persistent mirror and the viewport lock through their ports. Every
//! operation runs to completion synchronously; remote workflows observe the
//! session through [`EditSessionService::epoch`] and skip their effects once
//! the session they were dispatched for has been closed or reopened.
//!
//! Reconciliation rule for [`EditSessionService::open_for_update`]: when the
//! mirror holds a record with the same id as the incoming one and any key of
//! the incoming record differs canonically, the mirror wins and the create
//! draft is overwritten with it. Otherwise the incoming record is used.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use super::ports::{MirrorKey, PersistentMirror, ViewportLock};
use super::{
    DraftStore, EmployeeDraft, EmployeeField, EmployeeId, EmployeeRecord, FieldValue,
    SessionError, canonical, lock, validate_phone_number,
};

/// Which buffer field writes are routed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    /// Writes go to the create draft and are not persisted.
    #[default]
    Create,
    /// Writes go to the edit buffer and through to the mirror.
    Update,
}

/// Coarse lifecycle state derived from an [`EditSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The editor is not shown.
    Closed,
    /// The editor composes a new employee.
    Creating,
    /// The editor modifies an existing employee.
    Updating,
}

/// Snapshot of the edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    /// Whether the editor is shown.
    pub is_open: bool,
    /// Where field writes are routed.
    pub mode: EditMode,
    /// Employee the session was opened for, if any.
    pub target_employee_id: Option<EmployeeId>,
    /// Record held by the edit buffer.
    pub current: Option<EmployeeRecord>,
    /// Counter bumped on every open and close.
    pub epoch: u64,
}

impl EditSession {
    /// Lifecycle state of this snapshot.
    pub fn state(&self) -> SessionState {
        match (self.is_open, self.mode) {
            (false, _) => SessionState::Closed,
            (true, EditMode::Create) => SessionState::Creating,
            (true, EditMode::Update) => SessionState::Updating,
        }
    }

    fn begin(&mut self, mode: EditMode) {
        self.is_open = true;
        self.mode = mode;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// How [`EditSessionService::open_for_update`] chose the buffered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No record was supplied; the buffer stays empty.
    NoIncoming,
    /// The mirror held no usable record; the incoming record was used.
    MirrorAbsent,
    /// The mirror held a different employee; the incoming record was used.
    MirrorUnrelated,
    /// The mirror matched the incoming record key for key.
    IncomingMatchesMirror,
    /// The mirror held unsaved edits for this employee and replaced the
    /// incoming record.
    MirrorWins {
        /// Keys of the incoming record whose values differed.
        differing_keys: Vec<String>,
    },
}

/// Result of a field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value was stored.
    Applied,
    /// The value was refused and nothing changed.
    Rejected(RejectionReason),
}

/// Why a field write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The contact number failed phone validation.
    InvalidPhoneNumber,
    /// The value kind does not fit the field.
    ValueKindMismatch,
    /// Update mode is active but no record is buffered.
    NoRecordLoaded,
}

/// Owns the edit session and keeps the persistent mirror in step with it.
pub struct EditSessionService<M, V> {
    mirror: Arc<M>,
    viewport: Arc<V>,
    state: Mutex<EditSession>,
}

impl<M, V> EditSessionService<M, V>
where
    M: PersistentMirror,
    V: ViewportLock,
{
    /// Create a closed session over the given adapters.
    pub fn new(mirror: Arc<M>, viewport: Arc<V>) -> Self {
        Self {
            mirror,
            viewport,
            state: Mutex::new(EditSession::default()),
        }
    }

    /// The mirror this session writes through to.
    pub fn mirror(&self) -> &Arc<M> {
        &self.mirror
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> EditSession {
        lock(&self.state).clone()
    }

    /// Lifecycle state of the session.
    pub fn state(&self) -> SessionState {
        lock(&self.state).state()
    }

    /// Current epoch. Capture it when dispatching remote work.
    pub fn epoch(&self) -> u64 {
        lock(&self.state).epoch
    }

    /// Whether `epoch` still names the live session.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    /// Open the editor for a new employee.
    ///
    /// The draft's `new_employee` is reset to the empty record. The buffer
    /// is cleared and the background is scroll-locked. Returns the new
    /// epoch.
    pub fn open_for_create(&self, draft: Option<&DraftStore>) -> u64 {
        if let Some(store) = draft {
            store.with(EmployeeDraft::reset_new_employee);
        }
        let epoch = {
            let mut session = lock(&self.state);
            session.begin(EditMode::Create);
            session.target_employee_id = None;
            session.current = None;
            session.epoch
        };
        self.viewport.set_scroll_locked(true);
        debug!(epoch, "edit session opened for create");
        epoch
    }

    /// Open the editor for an existing employee.
    ///
    /// Reads the mirrored record and decides whether it or `incoming` is
    /// buffered. An unreadable mirror counts as absent. The mirror itself
    /// is never written here.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Canonical`] when `incoming` cannot be
    /// encoded for comparison. The session is left untouched in that case.
    pub fn open_for_update(
        &self,
        incoming: Option<&EmployeeRecord>,
        draft: Option<&DraftStore>,
    ) -> Result<ReconcileOutcome, SessionError> {
        let (outcome, current) = match incoming {
            None => (ReconcileOutcome::NoIncoming, None),
            Some(record) => self.reconcile(record)?,
        };

        if let (ReconcileOutcome::MirrorWins { .. }, Some(store), Some(mirrored)) =
            (&outcome, draft, current.as_ref())
        {
            store.with(|d| d.new_employee = mirrored.clone());
        }

        let epoch = {
            let mut session = lock(&self.state);
            session.begin(EditMode::Update);
            session.target_employee_id = incoming.and_then(|record| record.id.clone());
            session.current = current;
            session.epoch
        };
        self.viewport.set_scroll_locked(true);
        debug!(epoch, outcome = ?outcome, "edit session opened for update");
        Ok(outcome)
    }

    fn reconcile(
        &self,
        incoming: &EmployeeRecord,
    ) -> Result<(ReconcileOutcome, Option<EmployeeRecord>), SessionError> {
        let Some((mirror_tree, mirrored)) = self.read_mirrored_record() else {
            return Ok((ReconcileOutcome::MirrorAbsent, Some(incoming.clone())));
        };
        if mirrored.id != incoming.id {
            return Ok((ReconcileOutcome::MirrorUnrelated, Some(incoming.clone())));
        }

        let incoming_tree = canonical::to_tree(incoming)?;
        let differing_keys = canonical::differing_keys(&incoming_tree, &mirror_tree);
        if differing_keys.is_empty() {
            Ok((ReconcileOutcome::IncomingMatchesMirror, Some(incoming.clone())))
        } else {
            Ok((ReconcileOutcome::MirrorWins { differing_keys }, Some(mirrored)))
        }
    }

    fn read_mirrored_record(&self) -> Option<(Value, EmployeeRecord)> {
        let raw = match self.mirror.get(MirrorKey::EmployeeData) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "treating unreadable mirror as absent");
                return None;
            }
        };
        let decoded = canonical::decode::<Value>(&raw).and_then(|tree| {
            let record = serde_json::from_value::<EmployeeRecord>(tree.clone()).map_err(|err| {
                canonical::CanonicalError::Decode {
                    message: err.to_string(),
                }
            })?;
            Ok((tree, record))
        });
        match decoded {
            Ok(pair) => Some(pair),
            Err(err) => {
                warn!(error = %err, "treating malformed mirror record as absent");
                None
            }
        }
    }

    /// Peek at the record left in the mirror, e.g. after a reload.
    ///
    /// Unreadable or malformed entries yield `None`.
    pub fn pending_mirror_record(&self) -> Option<EmployeeRecord> {
        self.read_mirrored_record().map(|(_, record)| record)
    }

    /// Close the editor and discard all unsaved state.
    ///
    /// Unlocks scrolling, clears the draft's pending update and messages when
    /// a draft is supplied, then resets the buffer and the mirror.
    ///
    /// # Errors
    ///
    /// Returns the first mirror failure hit while resetting. The session is
    /// closed regardless.
    pub fn close_modal(&self, draft: Option<&DraftStore>) -> Result<(), SessionError> {
        match draft {
            Some(store) => {
                store.with(|pending| self.close_locked(&mut lock(&self.state), Some(pending)))
            }
            None => self.close_locked(&mut lock(&self.state), None),
        }
    }

    /// Close the editor on behalf of a workflow dispatched at `epoch`.
    ///
    /// The epoch check and the close happen under one session guard, so a
    /// session reopened in between is left alone. Returns `Ok(false)` when
    /// the session has moved on. The caller holds the draft guard.
    ///
    /// # Errors
    ///
    /// Returns the first mirror failure hit while resetting. The session is
    /// closed regardless.
    pub fn close_if_current(
        &self,
        epoch: u64,
        draft: &mut EmployeeDraft,
    ) -> Result<bool, SessionError> {
        let mut session = lock(&self.state);
        if session.epoch != epoch {
            return Ok(false);
        }
        self.close_locked(&mut session, Some(draft)).map(|()| true)
    }

    /// Run `effect` while `epoch` still names the live session.
    ///
    /// The session guard is held for the duration of `effect`, so no open
    /// or close can interleave with it. `effect` must not call back into
    /// the session state.
    pub fn if_current<R>(&self, epoch: u64, effect: impl FnOnce() -> R) -> Option<R> {
        let session = lock(&self.state);
        (session.epoch == epoch).then(effect)
    }

    fn close_locked(
        &self,
        session: &mut EditSession,
        draft: Option<&mut EmployeeDraft>,
    ) -> Result<(), SessionError> {
        self.viewport.set_scroll_locked(false);
        if let Some(pending) = draft {
            pending.clear_pending();
        }
        let reset = self.reset_locked(session);
        session.is_open = false;
        session.epoch = session.epoch.wrapping_add(1);
        debug!(epoch = session.epoch, "edit session closed");
        reset
    }

    /// Close the editor but keep the mirror intact.
    pub fn close_modal_without_refresh(&self) {
        let epoch = {
            let mut session = lock(&self.state);
            session.is_open = false;
            session.mode = EditMode::Create;
            session.current = None;
            session.epoch = session.epoch.wrapping_add(1);
            session.epoch
        };
        self.viewport.set_scroll_locked(false);
        debug!(epoch, "edit session closed without refresh");
    }

    /// Clear the buffer and reset the three mirror keys.
    ///
    /// Idempotent. Every key is reset even when an earlier step fails.
    ///
    /// # Errors
    ///
    /// Returns the first mirror failure.
    pub fn reset_employee_data(&self) -> Result<(), SessionError> {
        self.reset_locked(&mut lock(&self.state))
    }

    fn reset_locked(&self, session: &mut EditSession) -> Result<(), SessionError> {
        session.current = None;
        session.mode = EditMode::Create;
        session.target_employee_id = None;

        let results = [
            self.mirror.remove(MirrorKey::EmployeeData),
            self.mirror.remove(MirrorKey::UpdatedData),
            self.mirror.set(MirrorKey::DataChanged, "false"),
        ];
        let mut first_error = None;
        for result in results {
            if let Err(err) = result {
                warn!(error = %err, "mirror reset step failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), |err| Err(err.into()))
    }

    /// Record that the mirror holds no unsaved edits.
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any.
    pub fn mark_clean(&self) -> Result<(), SessionError> {
        self.mirror.set(MirrorKey::DataChanged, "false")?;
        Ok(())
    }

    pub(crate) fn read_field(&self, draft: &EmployeeDraft, field: EmployeeField) -> FieldValue {
        let session = lock(&self.state);
        match (session.mode, session.current.as_ref()) {
            (EditMode::Update, Some(current)) => current.field(field),
            (EditMode::Update, None) => EmployeeRecord::empty().field(field),
            (EditMode::Create, _) => draft.new_employee.field(field),
        }
    }

    /// Route one field write. The caller holds the draft guard, so the
    /// session is locked second.
    pub(crate) fn write_field(
        &self,
        draft: &mut EmployeeDraft,
        field: EmployeeField,
        value: FieldValue,
    ) -> Result<WriteOutcome, SessionError> {
        let mut session = lock(&self.state);
        if session.mode == EditMode::Create {
            return Ok(match draft.new_employee.assign(field, value) {
                Ok(()) => WriteOutcome::Applied,
                Err(_) => WriteOutcome::Rejected(RejectionReason::ValueKindMismatch),
            });
        }

        let Some(mut edited) = session.current.clone() else {
            return Ok(WriteOutcome::Rejected(RejectionReason::NoRecordLoaded));
        };
        if edited.assign(field, value).is_err() {
            return Ok(WriteOutcome::Rejected(RejectionReason::ValueKindMismatch));
        }
        if field == EmployeeField::ContactNumber && !validate_phone_number(&edited.contact_number) {
            debug!(field = %field, "rejected invalid phone number");
            return Ok(WriteOutcome::Rejected(RejectionReason::InvalidPhoneNumber));
        }

        // Normalise through the canonical form before buffering.
        let encoded = canonical::encode(&edited)?;
        let normalised: EmployeeRecord = canonical::decode(&encoded)?;

        // The mirror is written first so a failed write leaves the buffer
        // and the draft as they were.
        self.persist_edit(&encoded)?;
        session.current = Some(normalised.clone());
        drop(session);
        draft.data_changed = true;
        draft.updated_data = Some(normalised);
        Ok(WriteOutcome::Applied)
    }

    /// Write an edited record through to the mirror, flag last.
    ///
    /// When a write fails, the keys already written get their previous
    /// values back so `dataChanged` never vouches for a stale `updatedData`.
    fn persist_edit(&self, encoded: &str) -> Result<(), SessionError> {
        const WRITE_ORDER: [MirrorKey; 3] = [
            MirrorKey::EmployeeData,
            MirrorKey::UpdatedData,
            MirrorKey::DataChanged,
        ];
        let mut previous = Vec::with_capacity(WRITE_ORDER.len());
        for key in WRITE_ORDER {
            previous.push((key, self.mirror.get(key)?));
        }

        for (written, (key, _)) in previous.iter().enumerate() {
            let value = if *key == MirrorKey::DataChanged {
                "true"
            } else {
                encoded
            };
            if let Err(err) = self.mirror.set(*key, value) {
                self.restore_entries(previous.iter().take(written));
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn restore_entries<'a>(&self, entries: impl Iterator<Item = &'a (MirrorKey, Option<String>)>) {
        for (key, value) in entries {
            let restored = match value {
                Some(value) => self.mirror.set(*key, value),
                None => self.mirror.remove(*key),
            };
            if let Err(err) = restored {
                warn!(key = key.as_str(), error = %err, "mirror key left half-written");
            }
        }
    }
}

#[cfg(test)]
#[path = "edit_session_tests.rs"]
mod tests;
