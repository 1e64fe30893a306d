//! Port for remote skill persistence.

use async_trait::async_trait;

use crate::domain::{EmployeeId, SkillId, SkillRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by skill service adapters.
    pub enum SkillServiceError {
        /// The request could not be delivered or the backend failed.
        Transport {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "skill service transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "skill service request timed out: {message}",
        /// The addressed skill does not exist.
        NotFound {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "skill not found: {message}",
        /// The backend refused the payload.
        Rejected {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "skill service rejected the request: {message}",
        /// The response body could not be decoded.
        Decode {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "skill service response could not be decoded: {message}",
    }
}

/// Port for remote skill CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillService: Send + Sync {
    /// List every skill known to the backend.
    async fn list(&self) -> Result<Vec<SkillRecord>, SkillServiceError>;

    /// Create `skill` for the employee identified by `employee`.
    async fn create(
        &self,
        employee: &EmployeeId,
        skill: &SkillRecord,
    ) -> Result<SkillRecord, SkillServiceError>;

    /// Replace the skill identified by `id`.
    async fn update(&self, id: SkillId, skill: &SkillRecord) -> Result<(), SkillServiceError>;

    /// Delete the skill identified by `id`.
    async fn delete(&self, id: SkillId) -> Result<(), SkillServiceError>;
}

/// Fixture implementation for tests that do not exercise skills.
///
/// Listing is empty, creation echoes the skill with id `1` bound to the
/// employee, updates and deletes succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSkillService;

#[async_trait]
impl SkillService for FixtureSkillService {
    async fn list(&self) -> Result<Vec<SkillRecord>, SkillServiceError> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        employee: &EmployeeId,
        skill: &SkillRecord,
    ) -> Result<SkillRecord, SkillServiceError> {
        Ok(SkillRecord {
            id: Some(SkillId::new(1)),
            ..skill.for_employee(employee)
        })
    }

    async fn update(&self, _id: SkillId, _skill: &SkillRecord) -> Result<(), SkillServiceError> {
        Ok(())
    }

    async fn delete(&self, _id: SkillId) -> Result<(), SkillServiceError> {
        Ok(())
    }
}
