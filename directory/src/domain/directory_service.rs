//! Remote directory workflows.
//!
//! [`EmployeeDirectoryService`] owns the employee list, the skill catalogue
//! and the create draft. Its workflows call the directory and skill ports
//! and then apply their effects locally. Effects that belong to an edit
//! session are applied only while the epoch captured at dispatch is still
//! current; list refreshes always apply.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::ports::{
    EmployeeDirectory, EmployeeDirectoryError, PersistentMirror, SkillService, ViewportLock,
};
use super::{
    DirectoryError, DraftStore, EditSessionService, EmployeeDraft, EmployeeFilter, EmployeeId,
    EmployeeRecord, FieldMessages, MissingEmployeeId, SkillId, SkillRecord, lock,
};

/// Message recorded against `email` when the address is taken.
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already exists";

/// Query that produced the current employee list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListQuery {
    /// Every employee.
    #[default]
    All,
    /// Free-text search.
    Search(String),
    /// Structured filter.
    Filter(EmployeeFilter),
}

#[derive(Debug, Default)]
struct DirectoryState {
    employees: Vec<EmployeeRecord>,
    skills: Vec<SkillRecord>,
    query: ListQuery,
}

/// Collapse skills sharing a name. The first occurrence keeps its position
/// and the last occurrence supplies the value.
pub fn dedupe_skills_by_name(skills: Vec<SkillRecord>) -> Vec<SkillRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<SkillRecord> = Vec::new();
    for skill in skills {
        if let Some(slot) = positions
            .get(&skill.name)
            .and_then(|&index| unique.get_mut(index))
        {
            *slot = skill;
        } else {
            positions.insert(skill.name.clone(), unique.len());
            unique.push(skill);
        }
    }
    unique
}

fn log_stale<M, V>(session: &EditSessionService<M, V>, epoch: u64, workflow: &str)
where
    M: PersistentMirror,
    V: ViewportLock,
{
    debug!(
        workflow,
        dispatched = epoch,
        current = session.epoch(),
        "skipping stale session effects"
    );
}

/// Service driving the employee and skill workflows.
pub struct EmployeeDirectoryService<D, S> {
    directory: Arc<D>,
    skills: Arc<S>,
    draft: Arc<DraftStore>,
    state: Mutex<DirectoryState>,
}

impl<D, S> EmployeeDirectoryService<D, S>
where
    D: EmployeeDirectory,
    S: SkillService,
{
    /// Create a service with an empty list around an existing draft.
    pub fn new(directory: Arc<D>, skills: Arc<S>, draft: Arc<DraftStore>) -> Self {
        Self {
            directory,
            skills,
            draft,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// Draft shared with the editor.
    pub fn draft(&self) -> &Arc<DraftStore> {
        &self.draft
    }

    /// Copy of the employee list.
    pub fn employees(&self) -> Vec<EmployeeRecord> {
        lock(&self.state).employees.clone()
    }

    /// Copy of the de-duplicated skill catalogue.
    pub fn skill_catalogue(&self) -> Vec<SkillRecord> {
        lock(&self.state).skills.clone()
    }

    /// Query that produced the current list.
    pub fn active_query(&self) -> ListQuery {
        lock(&self.state).query.clone()
    }

    async fn load(&self, query: ListQuery) -> Result<usize, DirectoryError> {
        let employees = match &query {
            ListQuery::All => self.directory.fetch_all().await,
            ListQuery::Search(term) => self.directory.search(term).await,
            ListQuery::Filter(filter) => self.directory.filter(filter).await,
        }
        .inspect_err(|err| debug!(error = %err, query = ?query, "employee list request failed"))?;

        let count = employees.len();
        let mut state = lock(&self.state);
        state.employees = employees;
        state.query = query;
        Ok(count)
    }

    /// Replace the list with every employee.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; the list is left as it was.
    pub async fn fetch_employees(&self) -> Result<usize, DirectoryError> {
        self.load(ListQuery::All).await
    }

    /// Replace the list with the employees matching `term`.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; the list is left as it was.
    pub async fn search_employees(&self, term: &str) -> Result<usize, DirectoryError> {
        self.load(ListQuery::Search(term.to_owned())).await
    }

    /// Replace the list with the employees matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; the list is left as it was.
    pub async fn filter_employees(&self, filter: &EmployeeFilter) -> Result<usize, DirectoryError> {
        self.load(ListQuery::Filter(filter.clone())).await
    }

    /// Re-run the active query.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; the list is left as it was.
    pub async fn refresh(&self) -> Result<usize, DirectoryError> {
        let query = self.active_query();
        self.load(query).await
    }

    async fn refresh_logged(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "employee list refresh failed");
        }
    }

    /// Submit the create draft.
    ///
    /// Every skill on the draft is created against the issued id; skill
    /// failures are logged. On success the session is closed and the list
    /// refreshed. A rejection's field messages are copied into the draft.
    ///
    /// # Errors
    ///
    /// Returns the directory failure, or [`MissingEmployeeId`] when the
    /// backend answered without an id.
    pub async fn create_employee<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
    ) -> Result<EmployeeRecord, DirectoryError>
    where
        M: PersistentMirror,
        V: ViewportLock,
    {
        let record = self.draft.with(|draft| draft.new_employee.clone());
        let created = match self.directory.create(&record).await {
            Ok(created) => created,
            Err(err) => {
                self.record_rejection(session, epoch, &err);
                return Err(err.into());
            }
        };
        let id = created.id.clone().ok_or(MissingEmployeeId)?;
        info!(employee_id = %id, "employee created");

        for skill in &record.skills {
            if let Err(err) = self.create_skill(&id, skill).await {
                warn!(employee_id = %id, skill = %skill.name, error = %err, "skill creation failed");
            }
        }

        self.close_if_current(session, epoch, "create_employee");
        self.refresh_logged().await;
        Ok(created)
    }

    /// Close the session for a completed workflow unless it has moved on.
    /// The draft's pending state is cleared under the same guards.
    fn close_if_current<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        workflow: &str,
    ) where
        M: PersistentMirror,
        V: ViewportLock,
    {
        match self.draft.with(|draft| session.close_if_current(epoch, draft)) {
            Ok(true) => {}
            Ok(false) => log_stale(session, epoch, workflow),
            Err(err) => warn!(workflow, error = %err, "closing editor left the mirror dirty"),
        }
    }

    fn apply_if_current<M, V, R>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        workflow: &str,
        effect: impl FnOnce(&mut EmployeeDraft) -> R,
    ) -> Option<R>
    where
        M: PersistentMirror,
        V: ViewportLock,
    {
        let applied = self
            .draft
            .with(|draft| session.if_current(epoch, || effect(draft)));
        if applied.is_none() {
            log_stale(session, epoch, workflow);
        }
        applied
    }

    fn record_rejection<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        err: &EmployeeDirectoryError,
    ) where
        M: PersistentMirror,
        V: ViewportLock,
    {
        debug!(error = %err, "employee create failed");
        let Some(messages) = err.field_messages() else {
            return;
        };
        self.apply_if_current(session, epoch, "create_employee", |draft| {
            draft.message = Some(messages.clone());
        });
    }

    /// Submit an edited employee and synchronise its skills.
    ///
    /// Skills without an id are created when complete and skipped
    /// otherwise; skills with an id are updated. Skill failures are logged.
    /// Whatever the outcome, the session is closed, the pending update is
    /// cleared and the list is refreshed.
    ///
    /// # Errors
    ///
    /// Returns [`MissingEmployeeId`] for an unsaved record or the directory
    /// failure.
    pub async fn update_employee<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, DirectoryError>
    where
        M: PersistentMirror,
        V: ViewportLock,
    {
        let result = self.submit_update(record).await;
        if let Err(err) = &result {
            warn!(error = %err, "employee update failed");
        }

        self.close_if_current(session, epoch, "update_employee");
        self.refresh_logged().await;
        result
    }

    async fn submit_update(&self, record: &EmployeeRecord) -> Result<EmployeeRecord, DirectoryError> {
        let id = record.id.clone().ok_or(MissingEmployeeId)?;
        let updated = self.directory.update(&id, record).await?;
        info!(employee_id = %id, "employee updated");

        let owner = updated.id.clone().unwrap_or(id);
        for skill in &record.skills {
            let synced = match skill.id {
                Some(skill_id) => self.update_skill(skill_id, skill).await,
                None if skill.is_complete() => self.create_skill(&owner, skill).await.map(drop),
                None => {
                    debug!(skill = %skill.name, "skipping incomplete skill");
                    Ok(())
                }
            };
            if let Err(err) = synced {
                warn!(employee_id = %owner, skill = %skill.name, error = %err, "skill sync failed");
            }
        }
        Ok(updated)
    }

    /// Delete an employee.
    ///
    /// On success the employee leaves the list and the mirror is marked
    /// clean.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; nothing changes locally.
    pub async fn delete_employee<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        id: &EmployeeId,
    ) -> Result<(), DirectoryError>
    where
        M: PersistentMirror,
        V: ViewportLock,
    {
        self.directory
            .delete(id)
            .await
            .inspect_err(|err| warn!(employee_id = %id, error = %err, "employee delete failed"))?;
        info!(employee_id = %id, "employee deleted");

        lock(&self.state)
            .employees
            .retain(|employee| employee.id.as_ref() != Some(id));

        self.apply_if_current(session, epoch, "delete_employee", |draft| {
            draft.data_changed = false;
            session.mark_clean()
        })
        .transpose()?;
        Ok(())
    }

    /// Ask whether `email` is taken and record the answer on the draft.
    ///
    /// Addresses of three characters or fewer are not checked and yield
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns the directory failure; the draft is left as it was.
    pub async fn check_email_exists<M, V>(
        &self,
        session: &EditSessionService<M, V>,
        epoch: u64,
        email: &str,
    ) -> Result<Option<bool>, DirectoryError>
    where
        M: PersistentMirror,
        V: ViewportLock,
    {
        if email.chars().count() <= 3 {
            return Ok(None);
        }
        let exists = self.directory.email_exists(email).await?;
        self.apply_if_current(session, epoch, "check_email_exists", |draft| {
            draft.message = exists.then(|| FieldMessages::single("email", EMAIL_TAKEN_MESSAGE));
        });
        Ok(Some(exists))
    }

    /// Create `skill` for `employee`.
    ///
    /// # Errors
    ///
    /// Returns the skill service failure.
    pub async fn create_skill(
        &self,
        employee: &EmployeeId,
        skill: &SkillRecord,
    ) -> Result<SkillRecord, DirectoryError> {
        let created = self.skills.create(employee, skill).await?;
        info!(employee_id = %employee, skill_id = ?created.id, "skill created");
        Ok(created)
    }

    /// Replace the skill identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns the skill service failure.
    pub async fn update_skill(&self, id: SkillId, skill: &SkillRecord) -> Result<(), DirectoryError> {
        self.skills.update(id, skill).await?;
        info!(skill_id = %id, "skill updated");
        Ok(())
    }

    /// Delete the skill identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns the skill service failure.
    pub async fn delete_skill(&self, id: SkillId) -> Result<(), DirectoryError> {
        self.skills
            .delete(id)
            .await
            .inspect_err(|err| warn!(skill_id = %id, error = %err, "skill delete failed"))?;
        info!(skill_id = %id, "skill deleted");
        Ok(())
    }

    /// Replace the skill catalogue, one entry per skill name.
    ///
    /// # Errors
    ///
    /// Returns the skill service failure; the catalogue is left as it was.
    pub async fn fetch_skills(&self) -> Result<usize, DirectoryError> {
        let skills = dedupe_skills_by_name(self.skills.list().await?);
        let count = skills.len();
        lock(&self.state).skills = skills;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "directory_service_tests.rs"]
mod tests;
