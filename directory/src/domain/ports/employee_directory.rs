//! Port for the remote employee directory.
//!
//! The [`EmployeeDirectory`] trait is the contract the directory service uses
//! to list, search, create, update and delete employees. Adapters own the
//! transport; the domain only sees records and typed failures.

use async_trait::async_trait;

use crate::domain::{EmployeeFilter, EmployeeId, EmployeeRecord, FieldMessages};

use super::define_port_error;

define_port_error! {
    /// Errors raised by employee directory adapters.
    pub enum EmployeeDirectoryError {
        /// The request could not be delivered or the backend failed.
        Transport {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "employee directory transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "employee directory request timed out: {message}",
        /// The addressed employee does not exist.
        NotFound {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "employee not found: {message}",
        /// The backend refused the payload with field-level messages.
        Rejected {
            /// Field-level messages reported by the backend.
            messages: FieldMessages,
        } =>
            "employee directory rejected the request: {messages}",
        /// The response body could not be decoded.
        Decode {
            /// Adapter-supplied detail.
            message: String,
        } =>
            "employee directory response could not be decoded: {message}",
    }
}

impl EmployeeDirectoryError {
    /// Field messages carried by a rejection, if this is one.
    pub fn field_messages(&self) -> Option<&FieldMessages> {
        match self {
            Self::Rejected { messages } => Some(messages),
            _ => None,
        }
    }
}

/// Port for remote employee CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// List every employee.
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError>;

    /// List employees whose first name, last name or e-mail matches `term`.
    async fn search(&self, term: &str) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError>;

    /// List employees matching a structured filter.
    async fn filter(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError>;

    /// Create an employee. The returned record carries the issued id.
    async fn create(&self, record: &EmployeeRecord)
    -> Result<EmployeeRecord, EmployeeDirectoryError>;

    /// Replace the employee identified by `id`.
    async fn update(
        &self,
        id: &EmployeeId,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, EmployeeDirectoryError>;

    /// Delete the employee identified by `id`.
    async fn delete(&self, id: &EmployeeId) -> Result<(), EmployeeDirectoryError>;

    /// Whether any employee already uses `email`.
    async fn email_exists(&self, email: &str) -> Result<bool, EmployeeDirectoryError>;
}

/// Fixture implementation for tests that do not exercise the directory.
///
/// Lists are empty, creates and updates echo the payload back (creates are
/// issued the id `FX0000`), deletes succeed and no e-mail is taken.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmployeeDirectory;

#[async_trait]
impl EmployeeDirectory for FixtureEmployeeDirectory {
    async fn fetch_all(&self) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        Ok(Vec::new())
    }

    async fn search(&self, _term: &str) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        Ok(Vec::new())
    }

    async fn filter(
        &self,
        _filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeRecord>, EmployeeDirectoryError> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, EmployeeDirectoryError> {
        Ok(EmployeeRecord {
            id: Some(EmployeeId::new("FX0000")),
            ..record.clone()
        })
    }

    async fn update(
        &self,
        id: &EmployeeId,
        record: &EmployeeRecord,
    ) -> Result<EmployeeRecord, EmployeeDirectoryError> {
        Ok(EmployeeRecord {
            id: Some(id.clone()),
            ..record.clone()
        })
    }

    async fn delete(&self, _id: &EmployeeId) -> Result<(), EmployeeDirectoryError> {
        Ok(())
    }

    async fn email_exists(&self, _email: &str) -> Result<bool, EmployeeDirectoryError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_create_issues_an_id() {
        let directory = FixtureEmployeeDirectory;
        let created = directory
            .create(&EmployeeRecord::empty())
            .await
            .expect("fixture create should succeed");
        assert_eq!(created.id, Some(EmployeeId::new("FX0000")));
    }

    #[tokio::test]
    async fn fixture_update_keeps_the_addressed_id() {
        let directory = FixtureEmployeeDirectory;
        let id = EmployeeId::new("AB1234");
        let updated = directory
            .update(&id, &EmployeeRecord::empty())
            .await
            .expect("fixture update should succeed");
        assert_eq!(updated.id, Some(id));
    }

    #[test]
    fn rejection_exposes_field_messages() {
        let error =
            EmployeeDirectoryError::rejected(FieldMessages::single("email", "Email already exists"));
        assert!(
            error
                .field_messages()
                .is_some_and(|messages| messages.has_error("email"))
        );
        assert!(
            EmployeeDirectoryError::timeout("slow")
                .field_messages()
                .is_none()
        );
    }

    #[test]
    fn rejection_formats_messages() {
        let error =
            EmployeeDirectoryError::rejected(FieldMessages::single("postcode", "Too long"));
        assert_eq!(
            error.to_string(),
            "employee directory rejected the request: postcode: Too long"
        );
    }
}
